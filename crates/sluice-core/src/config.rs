use crate::constants::{
    DEFAULT_HANDLE_MAX, DEFAULT_INITIAL_DELIVERY_COUNT, DEFAULT_WORK_SET_CAPACITY,
    MAX_DELIVERY_TAG_LENGTH,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Configuration options to tune link, session and connection behavior.
pub struct Config {
    /// Longest delivery tag accepted by `Link::delivery`, in octets.
    pub max_delivery_tag_length: usize,
    /// Delivery count a sending link announces in its Attach.
    pub initial_delivery_count: u32,
    /// Maximum number of links a single session may host.
    pub handle_max: u32,
    /// Initial capacity reserved for a connection's work set.
    pub work_set_capacity: usize,
    /// Maximum number of locally unsettled deliveries per link (0 = unlimited).
    /// `Link::delivery` fails once the limit is reached.
    pub max_unsettled_deliveries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_delivery_tag_length: MAX_DELIVERY_TAG_LENGTH,
            initial_delivery_count: DEFAULT_INITIAL_DELIVERY_COUNT,
            handle_max: DEFAULT_HANDLE_MAX,
            work_set_capacity: DEFAULT_WORK_SET_CAPACITY,
            max_unsettled_deliveries: 0, // Unlimited
        }
    }
}
