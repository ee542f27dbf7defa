// Validation and policy constants (no magic numbers in the lifecycle ops)

pub const MAX_JOB_TYPE_LEN: usize = 128;
pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 10;
pub const MAX_PAYLOAD_DEPTH: usize = 32;

pub const MIN_MAX_ATTEMPTS: i32 = 1;
pub const MAX_MAX_ATTEMPTS: i32 = 10;

pub const MIN_LEASE_SECONDS: i64 = 5;
pub const MAX_LEASE_SECONDS: i64 = 300;

pub const DEFAULT_PRIORITY: i32 = 5;
pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

// Fixed backoff table: 1->10s, 2->30s, 3->90s, >=4->300s.
pub const BACKOFF_SCHEDULE_SECS: [i64; 4] = [10, 30, 90, 300];

// Default bound for a reconcile/requeue-ready sweep when the caller omits
// `limit`.
pub const DEFAULT_RECONCILE_LIMIT: i64 = 500;
