// Lifecycle Use Cases
//
// One file per state-machine operation, mirroring the job's transitions:
// submit (-> queued), lease (reserve), start (-> running), complete
// (-> completed), fail (-> queued | dead), reconcile (sweep expired
// leases), requeue_ready (re-seed the hint), plus the two read paths.

pub mod complete;
pub mod fail;
pub mod get;
pub mod lease;
pub mod list;
pub mod reconcile;
pub mod requeue_ready;
pub mod start;
pub mod submit;

pub use complete::execute as complete;
pub use fail::execute as fail;
pub use get::execute as get;
pub use lease::execute as lease;
pub use list::execute as list;
pub use reconcile::{execute as reconcile, ReconcileOutcome};
pub use requeue_ready::execute as requeue_ready;
pub use start::execute as start;
pub use submit::execute as submit;
