/// Behavior of a return when the inventory row exists but no open ledger
/// record does (a data anomaly, e.g. loans recorded outside this engine).
/// With `backfill_missing_record` the ledger synthesizes an already-closed
/// record stamped with the return time; otherwise the return fails and the
/// transaction rolls back.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ReturnPolicy {
    pub backfill_missing_record: bool,
}

pub trait DependOnReturnPolicy: 'static + Sync + Send {
    fn return_policy(&self) -> ReturnPolicy;
}
