//! Protobuf messages for Cosmos SDK transactions and Lava relay payments.
//!
//! Only the fields the leaderboard reads are declared; prost skips the rest.

use lava_leaderboard_core::RelaySession;

/// Type URL of the Lava pairing relay payment message.
pub const RELAY_PAYMENT_TYPE_URL: &str = "/lavanet.lava.pairing.MsgRelayPayment";

/// `google.protobuf.Any`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Any {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

/// `cosmos.tx.v1beta1.Tx`.
///
/// Block transactions arrive as `TxRaw`, whose `body_bytes` (field 1) is
/// the encoded `TxBody`, so `TxRaw` bytes decode directly as `Tx`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Tx {
    #[prost(message, optional, tag = "1")]
    pub body: Option<TxBody>,
    #[prost(bytes = "vec", tag = "2")]
    pub auth_info: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub signatures: Vec<Vec<u8>>,
}

/// `cosmos.tx.v1beta1.TxRaw`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TxRaw {
    #[prost(bytes = "vec", tag = "1")]
    pub body_bytes: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub auth_info_bytes: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub signatures: Vec<Vec<u8>>,
}

/// `cosmos.tx.v1beta1.TxBody`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TxBody {
    #[prost(message, repeated, tag = "1")]
    pub messages: Vec<Any>,
    #[prost(string, tag = "2")]
    pub memo: String,
    #[prost(uint64, tag = "3")]
    pub timeout_height: u64,
}

/// `lavanet.lava.pairing.MsgRelayPayment`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MsgRelayPayment {
    #[prost(string, tag = "1")]
    pub creator: String,
    #[prost(message, repeated, tag = "2")]
    pub relays: Vec<RelaySessionProto>,
    #[prost(string, tag = "3")]
    pub description_string: String,
}

/// `lavanet.lava.pairing.RelaySession`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct RelaySessionProto {
    #[prost(string, tag = "1")]
    pub spec_id: String,
    #[prost(bytes = "vec", tag = "2")]
    pub content_hash: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub session_id: u64,
    #[prost(uint64, tag = "4")]
    pub cu_sum: u64,
    #[prost(string, tag = "5")]
    pub provider: String,
    #[prost(uint64, tag = "6")]
    pub relay_num: u64,
    #[prost(int64, tag = "8")]
    pub epoch: i64,
    #[prost(string, tag = "10")]
    pub lava_chain_id: String,
    #[prost(bytes = "vec", tag = "11")]
    pub sig: Vec<u8>,
}

impl From<RelaySessionProto> for RelaySession {
    fn from(proto: RelaySessionProto) -> Self {
        Self {
            spec_id: proto.spec_id,
            relay_num: proto.relay_num,
            epoch: u64::try_from(proto.epoch).unwrap_or(0),
            provider: proto.provider,
            cu_sum: proto.cu_sum,
        }
    }
}
