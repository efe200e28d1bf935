// ── Domain model ──
//
// Three layers per resource kind: the declaration a caller writes (`*Spec`),
// the validated and normalized form (`*Settings`), and the canonical state
// of a bound instance (`Site`, `Device`) carrying the server-assigned id.

pub mod device;
pub mod id;
pub mod resource;
pub mod site;
pub mod snmp;

use strum::{Display, IntoStaticStr};

pub use device::{Device, DeviceSettings, DeviceSpec, SnmpV3Settings, SnmpV3Spec};
pub use id::{Parent, ResourceId};
pub use resource::Resource;
pub use site::{Site, SiteSettings, SiteSpec};
pub use snmp::{AuthProtocol, PrivProtocol, SecurityLevel, SnmpVersion};

/// Which kind of remote object an instance manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    Site,
    Device,
}
