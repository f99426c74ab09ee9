use metrics::counter;

/// Vending counters
#[derive(Clone)]
pub struct VendingMetrics {
    prefix: &'static str,
}

impl Default for VendingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl VendingMetrics {
    pub fn new() -> Self {
        Self {
            prefix: "tvm_vending",
        }
    }

    pub fn exchange_attempted(&self) {
        counter!(format!("{}.exchanges.attempted", self.prefix)).increment(1);
    }

    pub fn exchange_succeeded(&self) {
        counter!(format!("{}.exchanges.succeeded", self.prefix)).increment(1);
    }

    /// `reason` is an error code, never request data
    pub fn exchange_failed(&self, reason: &'static str) {
        counter!(format!("{}.exchanges.failed", self.prefix)).increment(1);
        counter!(format!("{}.exchanges.failed.{}", self.prefix, reason)).increment(1);
    }

    pub fn exchange_throttled(&self) {
        counter!(format!("{}.exchanges.throttled", self.prefix)).increment(1);
    }

    pub fn cache_hit(&self) {
        counter!(format!("{}.cache.hits", self.prefix)).increment(1);
    }

    pub fn cache_miss(&self) {
        counter!(format!("{}.cache.misses", self.prefix)).increment(1);
    }

    pub fn ambient_client_built(&self) {
        counter!(format!("{}.clients.ambient", self.prefix)).increment(1);
    }
}
