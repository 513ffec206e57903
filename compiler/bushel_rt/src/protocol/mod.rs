//! Boundary to remote automation targets.
//!
//! The runtime never speaks a wire format itself. It encodes values and
//! query chains into the [`WireValue`] model, hands a [`RemoteRequest`] to
//! the host's [`ProtocolAdapter`], and decodes the reply. Terms cross the
//! boundary by their code addresses only.

mod codec;

pub use codec::{decode, encode, encode_query};

use bushel_ir::{BinaryOp, InsertionKind, SemanticAddress};

use crate::errors::ErrorKind;
use crate::value::{Application, Value};

/// Failures reported by a protocol adapter.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("the target refused the event")]
    NotPermitted,
    #[error("the target does not handle this event")]
    EventNotHandled,
    #[error("send failed: {message}")]
    SendFailure { message: String },
    #[error("could not decode the reply: {message}")]
    DecodeFailure { message: String },
}

/// Placeholder roots as they appear on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WireRoot {
    Application,
    Container,
    Specimen,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WireOrdinal {
    First,
    Middle,
    Last,
    Random,
    All,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WireRelative {
    Previous,
    Next,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WireSelector {
    Property,
    Index(WireValue),
    Name(WireValue),
    Id(WireValue),
    Ordinal(WireOrdinal),
    Relative(WireRelative),
    Range { from: WireValue, thru: WireValue },
    Test(WireTest),
}

/// A `whose` clause on the wire.
#[derive(Clone, Debug, PartialEq)]
pub enum WireTest {
    Comparison {
        op: BinaryOp,
        lhs: WireValue,
        rhs: WireValue,
    },
    Logical {
        op: BinaryOp,
        operands: Vec<WireTest>,
    },
}

/// Where a query step starts from.
#[derive(Clone, Debug, PartialEq)]
pub enum WireContainer {
    Root(WireRoot),
    Query(Box<WireQuery>),
    Value(Box<WireValue>),
}

/// One step of an object query.
#[derive(Clone, Debug, PartialEq)]
pub struct WireQuery {
    pub container: WireContainer,
    /// Element class or property code.
    pub key: SemanticAddress,
    pub selector: WireSelector,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WireValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    List(Vec<WireValue>),
    /// Property-keyed record.
    Record(Vec<(SemanticAddress, WireValue)>),
    Type(SemanticAddress),
    Enum(SemanticAddress),
    Property(SemanticAddress),
    Query(Box<WireQuery>),
    Insertion {
        container: WireContainer,
        position: InsertionKind,
    },
    Application(Application),
}

/// A command sent to a remote target.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteRequest {
    pub application: Application,
    pub command: SemanticAddress,
    /// Arguments keyed by parameter code.
    pub arguments: Vec<(SemanticAddress, WireValue)>,
}

impl RemoteRequest {
    pub fn argument(&self, parameter: &SemanticAddress) -> Option<&WireValue> {
        self.arguments
            .iter()
            .find(|(p, _)| p == parameter)
            .map(|(_, v)| v)
    }
}

/// Host-supplied transport to remote automation targets.
///
/// Implementations must be usable from whichever thread runs the script.
pub trait ProtocolAdapter: Send + Sync {
    /// Send `request` and wait for the reply.
    fn send(&self, request: &RemoteRequest) -> Result<WireValue, ProtocolError>;

    fn encode(&self, value: &Value) -> Result<WireValue, ErrorKind> {
        encode(value)
    }

    /// Decode a reply; queries in it are rooted at `application`.
    fn decode(&self, wire: &WireValue, application: &Application) -> Value {
        decode(wire, application)
    }
}
