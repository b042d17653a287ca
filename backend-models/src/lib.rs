//! Wire types of the verb taxonomy REST backend.
//!
//! Only the fields the client reads are modelled; unknown fields are
//! ignored. Counts may arrive as numbers or numeric strings.

pub mod auth;
pub mod taxonomy;
pub mod users;

pub use auth::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest};
pub use taxonomy::{
    Colors, FamilyRecord, FamilyShowResponse, GroupRecord, GroupShowResponse, GroupsResponse,
    SubfamilyRecord, SubfamilyShowResponse, VerbEnvelope, VerbRecord,
};
pub use users::{ApiErrorBody, User, UserEnvelope, UserUpdate, UsersEnvelope};
