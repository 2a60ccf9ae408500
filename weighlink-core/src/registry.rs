//! Protocol registry
//!
//! An immutable id → descriptor table. Every descriptor is a `static`, so the
//! registry exists before the first lookup and never changes afterwards.

use tracing::debug;

use crate::protocol::{
    cas, generic, massak, massak_binary, mertech, mettler, shtrihm, ProtocolDescriptor,
    ProtocolId,
};

static PROTOCOLS: [&ProtocolDescriptor; ProtocolId::ALL.len()] = [
    &cas::CAS_SIMPLE,
    &mettler::METTLER_SICS,
    &massak_binary::MASSAK_100,
    &massak::MASSAK_PROTOCOL1,
    &massak::MASSAK_LITE,
    &massak::MASSAK_ATB,
    &massak::MASSAK_CONTINUOUS,
    &massak::MASSAK_ATB_P,
    &massak_binary::MASSAK_J,
    &massak::MASSA_K,
    &shtrihm::SHTRIH_M,
    &mertech::MERTECH,
    &generic::SIMULATOR,
    &generic::GENERIC,
];

/// Summary of a registered protocol, for configuration screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Look up a descriptor by configuration id
///
/// Never fails: unknown ids resolve to the `generic` descriptor.
///
/// # Examples
///
/// ```
/// use weighlink_core::{registry, ProtocolId};
///
/// assert_eq!(registry::get_protocol("mettler_sics").id, ProtocolId::MettlerSics);
/// assert_eq!(registry::get_protocol("no_such_scale").id, ProtocolId::Generic);
/// ```
pub fn get_protocol(id: &str) -> &'static ProtocolDescriptor {
    match id.parse::<ProtocolId>() {
        Ok(id) => id.descriptor(),
        Err(e) => {
            debug!("{}, falling back to generic", e);
            default_protocol()
        }
    }
}

/// Descriptor of last resort
pub fn default_protocol() -> &'static ProtocolDescriptor {
    &generic::GENERIC
}

/// All registered descriptors, in registration order
pub fn protocols() -> &'static [&'static ProtocolDescriptor] {
    &PROTOCOLS
}

/// Id, name and description of every registered protocol
pub fn list() -> Vec<ProtocolInfo> {
    PROTOCOLS
        .iter()
        .map(|p| ProtocolInfo {
            id: p.id.as_str(),
            name: p.name,
            description: p.description,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use proptest::prelude::*;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = protocols().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), PROTOCOLS.len());
    }

    #[test]
    fn test_registry_matches_id_table() {
        for (descriptor, id) in protocols().iter().zip(ProtocolId::ALL) {
            assert_eq!(descriptor.id, id);
            assert!(std::ptr::eq(*descriptor, id.descriptor()));
        }
    }

    #[test]
    fn test_unknown_id_falls_back_to_generic() {
        assert_eq!(get_protocol("").id, ProtocolId::Generic);
        assert_eq!(get_protocol("CAS_SIMPLE").id, ProtocolId::Generic);
        assert_eq!(get_protocol("cas_simple").id, ProtocolId::CasSimple);
    }

    #[test]
    fn test_list() {
        let list = list();
        assert_eq!(list.len(), ProtocolId::ALL.len());
        assert!(list.iter().any(|p| p.id == "generic"));
        assert!(list.iter().any(|p| p.id == "simulator"));
    }

    #[test]
    fn test_polling_protocols_have_weight_command() {
        for descriptor in protocols() {
            if descriptor.polling_required {
                assert!(
                    descriptor.weight_command().is_some(),
                    "{} polls without a command",
                    descriptor
                );
            }
        }
    }

    proptest! {
        #[test]
        fn parse_never_panics(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            for descriptor in protocols() {
                let _ = descriptor.parse(&data);
            }
        }

        #[test]
        fn parse_text_never_panics(text in ".{0,48}") {
            for descriptor in protocols() {
                let _ = descriptor.parse(text.as_str());
            }
        }
    }
}
