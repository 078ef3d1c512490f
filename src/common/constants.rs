/// CRM property keys read by the normalizer and written back by the upload
/// mapper. The search endpoint nests these under `properties`; snapshots may
/// carry them at the top level.
pub const PROP_OBJECT_ID: &str = "hs_object_id";
pub const PROP_RAW_EMAIL: &str = "raw_email";
pub const PROP_EMAIL: &str = "email";
pub const PROP_FIRST_NAME: &str = "firstname";
pub const PROP_LAST_NAME: &str = "lastname";
pub const PROP_ADDRESS: &str = "address";
pub const PROP_COUNTRY: &str = "country";
pub const PROP_PHONE: &str = "phone";
pub const PROP_INDUSTRY: &str = "industry";
pub const PROP_ORIGINAL_INDUSTRY: &str = "original_industry";
pub const PROP_CREATE_DATE: &str = "createdate";

/// Separator between industry tags in the CRM's flat string encoding.
pub const TAG_SEPARATOR: char = ';';

/// Marker used in a formatted phone number when the country has no
/// dial-code entry.
pub const UNKNOWN_DIAL_CODE: &str = "unknown";

/// Trailing digits kept as the local block when formatting a phone number.
pub const PHONE_LOCAL_DIGITS: usize = 6;
