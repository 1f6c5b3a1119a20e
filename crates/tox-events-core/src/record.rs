//! Record trait

/// One kind of event record stored in an [`EventLog`](crate::EventLog).
///
/// `Default` must produce the empty record: header fields zeroed and every
/// [`Payload`](crate::Payload) absent.
pub trait Record: Default {
    /// Short name of the event kind, used in log output
    const KIND: &'static str;

    /// Total payload bytes owned by this record
    fn payload_len(&self) -> usize {
        0
    }
}
