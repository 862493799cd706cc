/// Smallest share of an engineer that can be allocated.
pub const MIN_PERCENTAGE: i64 = 1;

/// Largest share of an engineer that a single allocation can take.
pub const MAX_PERCENTAGE: i64 = 100;

/// Total share an engineer can carry at any instant.
pub const MAX_CAPACITY: u32 = 100;

pub const ALLOCATION_ID_PREFIX: &str = "alloc-";

/// Number of hex digits after the prefix.
pub const ALLOCATION_ID_HEX_LEN: usize = 8;

/// Runtime date shape.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Load-file date shape.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Upper bound on a single tool request line.
pub const MAX_REQUEST_LEN: usize = 64 * 1024;
