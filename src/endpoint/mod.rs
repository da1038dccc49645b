//! Endpoint module - roles, protocol declarations, and per-protocol descriptors.
//!
//! - [`Role`] - closed role vocabulary with complements
//! - [`SupportedProtocol`] - wire declaration of one protocol
//! - [`build_endpoint_protocol`] / [`EndpointProtocols`] - frozen descriptors
//! - [`EndpointDeclaration`] - everything one side declares

mod declaration;
mod descriptor;
mod role;

pub use declaration::{EndpointDeclaration, EndpointDeclarationBuilder};
pub use descriptor::{
    build_endpoint_protocol, EndpointProtocolDescriptor, EndpointProtocols, SupportedProtocol,
};
pub use role::Role;
