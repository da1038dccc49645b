//! Typed capability sets: endpoint, protocol, and data object.

use super::dictionary::capability_type;

capability_type! {
    /// Capabilities an endpoint declares for the whole session.
    pub struct EndpointCapabilities {
        /// Seconds of inactivity after which a session may be closed.
        ACTIVE_TIMEOUT_PERIOD = "ActiveTimeoutPeriod" => active_timeout_period, set_active_timeout_period: long;
        CHANGE_PROPAGATION_PERIOD = "ChangePropagationPeriod" => change_propagation_period, set_change_propagation_period: long;
        CHANGE_RETENTION_PERIOD = "ChangeRetentionPeriod" => change_retention_period, set_change_retention_period: long;
        MAX_CONCURRENT_MULTIPART = "MaxConcurrentMultipart" => max_concurrent_multipart, set_max_concurrent_multipart: long;
        MAX_DATA_OBJECT_SIZE = "MaxDataObjectSize" => max_data_object_size, set_max_data_object_size: long;
        MAX_PART_SIZE = "MaxPartSize" => max_part_size, set_max_part_size: long;
        MAX_SESSION_CLIENT_COUNT = "MaxSessionClientCount" => max_session_client_count, set_max_session_client_count: long;
        MAX_WEB_SOCKET_FRAME_PAYLOAD_SIZE = "MaxWebSocketFramePayloadSize" => max_web_socket_frame_payload_size, set_max_web_socket_frame_payload_size: long;
        MAX_WEB_SOCKET_MESSAGE_PAYLOAD_SIZE = "MaxWebSocketMessagePayloadSize" => max_web_socket_message_payload_size, set_max_web_socket_message_payload_size: long;
        MULTIPART_MESSAGE_TIMEOUT_PERIOD = "MultipartMessageTimeoutPeriod" => multipart_message_timeout_period, set_multipart_message_timeout_period: long;
        RESPONSE_TIMEOUT_PERIOD = "ResponseTimeoutPeriod" => response_timeout_period, set_response_timeout_period: long;
        REQUEST_SESSION_TIMEOUT_PERIOD = "RequestSessionTimeoutPeriod" => request_session_timeout_period, set_request_session_timeout_period: long;
        SESSION_ESTABLISHMENT_TIMEOUT_PERIOD = "SessionEstablishmentTimeoutPeriod" => session_establishment_timeout_period, set_session_establishment_timeout_period: long;
        SUPPORTS_ALTERNATE_REQUEST_URIS = "SupportsAlternateRequestUris" => supports_alternate_request_uris, set_supports_alternate_request_uris: bool;
        SUPPORTS_MESSAGE_HEADER_EXTENSIONS = "SupportsMessageHeaderExtensions" => supports_message_header_extensions, set_supports_message_header_extensions: bool;
    }
}

capability_type! {
    /// Capabilities declared for one protocol.
    pub struct ProtocolCapabilities {
        FRAME_CHANGE_DETECTION_PERIOD = "FrameChangeDetectionPeriod" => frame_change_detection_period, set_frame_change_detection_period: long;
        MAX_DATA_ARRAY_SIZE = "MaxDataArraySize" => max_data_array_size, set_max_data_array_size: long;
        MAX_DATA_OBJECT_SIZE = "MaxDataObjectSize" => max_data_object_size, set_max_data_object_size: long;
        MAX_FRAME_RESPONSE_COUNT = "MaxFrameResponseCount" => max_frame_response_count, set_max_frame_response_count: long;
        MAX_INDEX_COUNT = "MaxIndexCount" => max_index_count, set_max_index_count: long;
        MAX_RANGE_CHANNEL_COUNT = "MaxRangeChannelCount" => max_range_channel_count, set_max_range_channel_count: long;
        MAX_RANGE_DATA_ITEM_COUNT = "MaxRangeDataItemCount" => max_range_data_item_count, set_max_range_data_item_count: long;
        /// Maximum number of items in one response (multi-part responses count each part).
        MAX_RESPONSE_COUNT = "MaxResponseCount" => max_response_count, set_max_response_count: long;
        MAX_SUBSCRIPTION_SESSION_COUNT = "MaxSubscriptionSessionCount" => max_subscription_session_count, set_max_subscription_session_count: long;
        MAX_TRANSACTION_COUNT = "MaxTransactionCount" => max_transaction_count, set_max_transaction_count: long;
        SUPPORTS_SECONDARY_INDEX_FILTERING = "SupportsSecondaryIndexFiltering" => supports_secondary_index_filtering, set_supports_secondary_index_filtering: bool;
        TRANSACTION_TIMEOUT_PERIOD = "TransactionTimeoutPeriod" => transaction_timeout_period, set_transaction_timeout_period: long;
    }
}

capability_type! {
    /// Capabilities declared for one supported data object type or family.
    ///
    /// Every field is tri-state: unset means the declaring side said nothing,
    /// which is different from `false` or `0`.
    pub struct DataObjectCapabilities {
        ACTIVE_TIMEOUT_PERIOD = "ActiveTimeoutPeriod" => active_timeout_period, set_active_timeout_period: long;
        MAX_CONTAINED_DATA_OBJECT_COUNT = "MaxContainedDataObjectCount" => max_contained_data_object_count, set_max_contained_data_object_count: int;
        MAX_DATA_OBJECT_SIZE = "MaxDataObjectSize" => max_data_object_size, set_max_data_object_size: long;
        /// Whether deleting a container also prunes children left without a parent.
        ORPHANED_CHILDREN_PRUNED_ON_DELETE = "OrphanedChildrenPrunedOnDelete" => orphaned_children_pruned_on_delete, set_orphaned_children_pruned_on_delete: bool;
        SUPPORTS_GET = "SupportsGet" => supports_get, set_supports_get: bool;
        SUPPORTS_PUT = "SupportsPut" => supports_put, set_supports_put: bool;
        SUPPORTS_DELETE = "SupportsDelete" => supports_delete, set_supports_delete: bool;
        MAX_SECONDARY_INDEX_COUNT = "MaxSecondaryIndexCount" => max_secondary_index_count, set_max_secondary_index_count: int;
    }
}

impl DataObjectCapabilities {
    /// Combine with the counterpart's declaration into the negotiated view.
    ///
    /// Limits take the smaller declared value and flags hold only when every
    /// declaring side agrees. A field declared by one side keeps that value;
    /// a field neither side declared stays unset. Names without a typed
    /// accessor are kept from `self`.
    pub fn merge(&self, counterpart: &DataObjectCapabilities) -> DataObjectCapabilities {
        let mut merged = self.clone();
        merged.set_active_timeout_period(min_declared(
            self.active_timeout_period(),
            counterpart.active_timeout_period(),
        ));
        merged.set_max_contained_data_object_count(min_declared(
            self.max_contained_data_object_count(),
            counterpart.max_contained_data_object_count(),
        ));
        merged.set_max_data_object_size(min_declared(
            self.max_data_object_size(),
            counterpart.max_data_object_size(),
        ));
        merged.set_max_secondary_index_count(min_declared(
            self.max_secondary_index_count(),
            counterpart.max_secondary_index_count(),
        ));
        merged.set_orphaned_children_pruned_on_delete(all_declared(
            self.orphaned_children_pruned_on_delete(),
            counterpart.orphaned_children_pruned_on_delete(),
        ));
        merged.set_supports_get(all_declared(self.supports_get(), counterpart.supports_get()));
        merged.set_supports_put(all_declared(self.supports_put(), counterpart.supports_put()));
        merged.set_supports_delete(all_declared(
            self.supports_delete(),
            counterpart.supports_delete(),
        ));
        merged
    }
}

fn min_declared<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

fn all_declared(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a && b),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CapabilityBag, DataValue};

    #[test]
    fn test_unset_fields_are_unspecified() {
        let caps = DataObjectCapabilities::new();
        assert_eq!(caps.supports_get(), None);
        assert_eq!(caps.supports_put(), None);
        assert_eq!(caps.supports_delete(), None);
        assert_eq!(caps.max_data_object_size(), None);
        assert_eq!(caps.max_contained_data_object_count(), None);
        assert_eq!(caps.orphaned_children_pruned_on_delete(), None);
        assert_eq!(caps.active_timeout_period(), None);
        assert_eq!(caps.max_secondary_index_count(), None);
    }

    #[test]
    fn test_false_and_zero_are_distinct_from_unset() {
        let mut caps = DataObjectCapabilities::new();
        caps.set_supports_delete(Some(false));
        caps.set_max_secondary_index_count(Some(0));

        assert_eq!(caps.supports_delete(), Some(false));
        assert_eq!(caps.max_secondary_index_count(), Some(0));
        assert_eq!(caps.supports_get(), None);
    }

    #[test]
    fn test_typed_view_over_wire_bag() {
        let mut bag = CapabilityBag::new();
        bag.insert(
            DataObjectCapabilities::SUPPORTS_GET.to_string(),
            DataValue::Boolean(true),
        );
        bag.insert(
            DataObjectCapabilities::MAX_CONTAINED_DATA_OBJECT_COUNT.to_string(),
            DataValue::Long(50),
        );

        let caps = DataObjectCapabilities::from_bag(&bag);
        assert_eq!(caps.supports_get(), Some(true));
        assert_eq!(caps.max_contained_data_object_count(), Some(50));

        // The wrapper holds its own copy.
        bag.clear();
        assert_eq!(caps.supports_get(), Some(true));
    }

    #[test]
    fn test_clone_capabilities_then_mutate_clone() {
        let mut caps = ProtocolCapabilities::new();
        caps.set_max_response_count(Some(1000));

        let mut clone = caps.clone_capabilities();
        clone.insert("MaxResponseCount".to_string(), DataValue::Long(1));

        assert_eq!(caps.max_response_count(), Some(1000));
    }

    #[test]
    fn test_merge_takes_min_and_and() {
        let mut local = DataObjectCapabilities::new();
        local.set_max_data_object_size(Some(1_000_000));
        local.set_supports_put(Some(true));
        local.set_supports_delete(Some(true));

        let mut counterpart = DataObjectCapabilities::new();
        counterpart.set_max_data_object_size(Some(500_000));
        counterpart.set_supports_put(Some(false));
        counterpart.set_max_secondary_index_count(Some(3));

        let merged = local.merge(&counterpart);

        assert_eq!(merged.max_data_object_size(), Some(500_000));
        assert_eq!(merged.supports_put(), Some(false));
        assert_eq!(merged.supports_delete(), Some(true));
        assert_eq!(merged.max_secondary_index_count(), Some(3));
        assert_eq!(merged.supports_get(), None);
        assert_eq!(merged.active_timeout_period(), None);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut caps = EndpointCapabilities::new();
        caps.set_supports_message_header_extensions(Some(true));
        caps.set_max_part_size(Some(4096));

        let json = serde_json::to_value(&caps).unwrap();
        assert_eq!(json["SupportsMessageHeaderExtensions"], true);
        assert_eq!(json["MaxPartSize"], 4096);

        let back: EndpointCapabilities = serde_json::from_value(json).unwrap();
        assert_eq!(back.supports_message_header_extensions(), Some(true));
        assert_eq!(back.max_part_size(), Some(4096));
        assert_eq!(back.response_timeout_period(), None);
    }
}
