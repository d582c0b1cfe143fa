//! Index field names shared by the filter and sort grammars

/// Internal field holding the content type alias of a node
pub const NODE_TYPE_ALIAS: &str = "__NodeTypeAlias";

/// Node name, used for both filtering and sorting
pub const NAME: &str = "name";

/// Creation timestamp
pub const CREATE_DATE: &str = "createDate";

/// Last update timestamp
pub const UPDATE_DATE: &str = "updateDate";

/// Position among siblings
pub const SORT_ORDER: &str = "sortOrder";

/// Depth in the content tree
pub const LEVEL: &str = "level";
