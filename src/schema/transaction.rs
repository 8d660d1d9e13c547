//! Transaction (protocol 18): group store updates so they commit or roll
//! back together.

use bincode::{Decode, Encode};

use super::{Collections, MessageType, datatypes::Uuid};

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct StartTransaction {
    pub read_only: bool,
    pub message: String,
    pub dataspace_uris: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct StartTransactionResponse {
    pub transaction_uuid: Uuid,
    pub successful: bool,
    pub failure_reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct CommitTransaction {
    pub transaction_uuid: Uuid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct RollbackTransaction {
    pub transaction_uuid: Uuid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct CommitTransactionResponse {
    pub transaction_uuid: Uuid,
    pub successful: bool,
    pub failure_reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct RollbackTransactionResponse {
    pub transaction_uuid: Uuid,
    pub successful: bool,
    pub failure_reason: String,
}

message_types! {
    18 => {
        StartTransaction = 1,
        StartTransactionResponse = 2,
        CommitTransaction = 3,
        RollbackTransaction = 4,
        CommitTransactionResponse = 5,
        RollbackTransactionResponse = 6,
    }
}

collections!(StartTransaction, dataspace_uris);
impl Collections for StartTransactionResponse {}
impl Collections for CommitTransaction {}
impl Collections for RollbackTransaction {}
impl Collections for CommitTransactionResponse {}
impl Collections for RollbackTransactionResponse {}
