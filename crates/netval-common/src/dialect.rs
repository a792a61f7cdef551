//! Device OS dialects and their structured-output key tables.
//!
//! A dialect is resolved once from the caller's connection-handler
//! identifier(s) by substring match. Each dialect owns a `'static`
//! [`KeyTable`] mapping canonical field roles to the field names its
//! structured output uses. Roles a dialect never reports are empty strings.
//!
//! | role group | IOS / ASA source | NX-OS source |
//! |------------|------------------|--------------|
//! | `intf_*` | `show interfaces status` / `show interface` | `show interface status \| json` |
//! | `ip_*` | `show ip interface` / `show interface` | `show ip interface vrf all \| json` |
//! | `rt_*` | `show ip route` / `show route` | `show ip route vrf all` |
//! | `acl_*` | `show ip access-lists` / `show access-list` | `show ip access-lists \| json` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// A device operating-system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Cisco IOS and IOS-XE.
    Ios,
    /// Cisco NX-OS.
    Nxos,
    /// Cisco ASA.
    Asa,
    /// Cisco wireless LAN controller (AireOS).
    Wlc,
    /// Viptela SD-WAN (vEdge / cEdge in viptela mode).
    Viptela,
}

/// Substring probes in resolution order. `nxos` must be tested before the
/// generic `ios` token.
const PROBES: &[(&str, Dialect)] = &[
    ("nxos", Dialect::Nxos),
    ("viptela", Dialect::Viptela),
    ("vedge", Dialect::Viptela),
    ("asa", Dialect::Asa),
    ("wlc", Dialect::Wlc),
    ("ios", Dialect::Ios),
];

impl Dialect {
    /// All supported dialects.
    pub const ALL: [Dialect; 5] = [
        Dialect::Ios,
        Dialect::Nxos,
        Dialect::Asa,
        Dialect::Wlc,
        Dialect::Viptela,
    ];

    /// Resolves a dialect from a (possibly composite) handler identifier,
    /// e.g. `"cisco_nxos_ssh"` or `"nxos,netmiko"`.
    pub fn resolve(identifier: &str) -> Option<Dialect> {
        let lowered = identifier.to_ascii_lowercase();
        PROBES
            .iter()
            .find(|(token, _)| lowered.contains(token))
            .map(|(_, dialect)| *dialect)
    }

    /// Resolves a dialect from a list of connection-handler identifiers.
    pub fn from_handlers<I, S>(handlers: I) -> Option<Dialect>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: Vec<String> = handlers
            .into_iter()
            .map(|h| h.as_ref().to_string())
            .collect();
        Dialect::resolve(&joined.join(","))
    }

    /// Returns the canonical short name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Ios => "ios",
            Dialect::Nxos => "nxos",
            Dialect::Asa => "asa",
            Dialect::Wlc => "wlc",
            Dialect::Viptela => "viptela",
        }
    }

    /// Returns the dialect's key table.
    pub fn keys(&self) -> &'static KeyTable {
        match self {
            Dialect::Ios => &IOS_KEYS,
            Dialect::Nxos => &NXOS_KEYS,
            Dialect::Asa => &ASA_KEYS,
            Dialect::Wlc => &WLC_KEYS,
            Dialect::Viptela => &VIPTELA_KEYS,
        }
    }

    /// True if ACL entries carry an inverted wildcard mask rather than a
    /// netmask.
    pub fn acl_mask_is_wildcard(&self) -> bool {
        matches!(self, Dialect::Ios | Dialect::Nxos)
    }

    /// Address used for an ACL entry that carries no address detail.
    pub fn default_acl_address(&self) -> &'static str {
        "any"
    }

    /// Lines between a `show mac address-table count` VLAN label and the
    /// line holding that VLAN's total.
    pub fn mac_count_offset(&self) -> usize {
        match self {
            Dialect::Ios | Dialect::Nxos => 4,
            Dialect::Asa | Dialect::Wlc | Dialect::Viptela => 1,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field names used by one dialect's structured records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTable {
    /// Software version (`show version`).
    pub image: &'static str,

    pub mod_num: &'static str,
    pub mod_model: &'static str,
    pub mod_status: &'static str,

    pub intf_name: &'static str,
    pub intf_desc: &'static str,
    pub intf_status: &'static str,
    pub intf_vlan: &'static str,
    pub intf_duplex: &'static str,
    pub intf_speed: &'static str,
    pub intf_type: &'static str,

    pub ip_intf: &'static str,
    pub ip_addr: &'static str,
    /// Prefix length or dotted netmask column.
    pub ip_mask: &'static str,
    pub ip_link: &'static str,
    pub ip_proto: &'static str,

    pub swp_intf: &'static str,
    pub swp_mode: &'static str,
    pub swp_access_vlan: &'static str,
    pub swp_native_vlan: &'static str,
    pub swp_trunk_vlans: &'static str,

    pub vlan_id: &'static str,
    pub vlan_name: &'static str,
    pub vlan_intf: &'static str,

    pub hsrp_intf: &'static str,
    pub hsrp_group: &'static str,
    pub hsrp_priority: &'static str,
    pub hsrp_state: &'static str,
    pub hsrp_vip: &'static str,

    pub po_name: &'static str,
    pub po_protocol: &'static str,
    pub po_status: &'static str,
    pub po_members: &'static str,
    pub po_member_status: &'static str,

    pub rt_vrf: &'static str,
    pub rt_protocol: &'static str,
    pub rt_type: &'static str,
    pub rt_network: &'static str,
    pub rt_mask: &'static str,
    pub rt_nh_ip: &'static str,
    pub rt_nh_intf: &'static str,

    pub acl_name: &'static str,
    pub acl_seq: &'static str,
    pub acl_action: &'static str,
    /// Separate remark text column, for dialects that do not report
    /// remarks through the action column.
    pub acl_remark: &'static str,
    pub acl_protocol: &'static str,
    pub acl_src_host: &'static str,
    pub acl_src_any: &'static str,
    pub acl_src_network: &'static str,
    pub acl_src_mask: &'static str,
    pub acl_dst_host: &'static str,
    pub acl_dst_any: &'static str,
    pub acl_dst_network: &'static str,
    pub acl_dst_mask: &'static str,
    pub acl_dst_port: &'static str,

    pub bgp_peer: &'static str,
    pub bgp_peer_as: &'static str,
    /// Session state, where it is reported apart from the prefix count.
    pub bgp_state: &'static str,
    pub bgp_pfx_rcv: &'static str,

    pub ospf_nbr_id: &'static str,
    pub ospf_nbr_intf: &'static str,
    pub ospf_nbr_state: &'static str,
    pub ospf_intf: &'static str,
    pub ospf_area: &'static str,
    pub ospf_cost: &'static str,
    pub ospf_nbr_count: &'static str,

    pub cdp_local_intf: &'static str,
    pub cdp_remote_host: &'static str,
    pub cdp_remote_port: &'static str,
    pub lldp_local_intf: &'static str,
    pub lldp_remote_host: &'static str,
    pub lldp_remote_port: &'static str,
}

impl KeyTable {
    /// A table with every role unsupported.
    pub const EMPTY: KeyTable = KeyTable {
        image: "",
        mod_num: "",
        mod_model: "",
        mod_status: "",
        intf_name: "",
        intf_desc: "",
        intf_status: "",
        intf_vlan: "",
        intf_duplex: "",
        intf_speed: "",
        intf_type: "",
        ip_intf: "",
        ip_addr: "",
        ip_mask: "",
        ip_link: "",
        ip_proto: "",
        swp_intf: "",
        swp_mode: "",
        swp_access_vlan: "",
        swp_native_vlan: "",
        swp_trunk_vlans: "",
        vlan_id: "",
        vlan_name: "",
        vlan_intf: "",
        hsrp_intf: "",
        hsrp_group: "",
        hsrp_priority: "",
        hsrp_state: "",
        hsrp_vip: "",
        po_name: "",
        po_protocol: "",
        po_status: "",
        po_members: "",
        po_member_status: "",
        rt_vrf: "",
        rt_protocol: "",
        rt_type: "",
        rt_network: "",
        rt_mask: "",
        rt_nh_ip: "",
        rt_nh_intf: "",
        acl_name: "",
        acl_seq: "",
        acl_action: "",
        acl_remark: "",
        acl_protocol: "",
        acl_src_host: "",
        acl_src_any: "",
        acl_src_network: "",
        acl_src_mask: "",
        acl_dst_host: "",
        acl_dst_any: "",
        acl_dst_network: "",
        acl_dst_mask: "",
        acl_dst_port: "",
        bgp_peer: "",
        bgp_peer_as: "",
        bgp_state: "",
        bgp_pfx_rcv: "",
        ospf_nbr_id: "",
        ospf_nbr_intf: "",
        ospf_nbr_state: "",
        ospf_intf: "",
        ospf_area: "",
        ospf_cost: "",
        ospf_nbr_count: "",
        cdp_local_intf: "",
        cdp_remote_host: "",
        cdp_remote_port: "",
        lldp_local_intf: "",
        lldp_remote_host: "",
        lldp_remote_port: "",
    };
}

/// Returns true if a key-table role names a field, i.e. the dialect
/// reports it.
pub fn is_supported(role: &str) -> bool {
    !role.is_empty()
}

pub static IOS_KEYS: KeyTable = KeyTable {
    image: "VERSION",
    mod_num: "MODULE",
    mod_model: "MODEL",
    mod_status: "STATUS",
    intf_name: "PORT",
    intf_desc: "NAME",
    intf_status: "STATUS",
    intf_vlan: "VLAN_ID",
    intf_duplex: "DUPLEX",
    intf_speed: "SPEED",
    intf_type: "TYPE",
    ip_intf: "INTERFACE",
    ip_addr: "IP_ADDRESS",
    ip_mask: "PREFIX_LENGTH",
    ip_link: "LINK_STATUS",
    ip_proto: "PROTOCOL_STATUS",
    swp_intf: "INTERFACE",
    swp_mode: "MODE",
    swp_access_vlan: "ACCESS_VLAN",
    swp_native_vlan: "NATIVE_VLAN",
    swp_trunk_vlans: "TRUNKING_VLANS",
    vlan_id: "VLAN_ID",
    vlan_name: "VLAN_NAME",
    vlan_intf: "INTERFACES",
    hsrp_intf: "INTERFACE",
    hsrp_group: "GROUP",
    hsrp_priority: "PRIORITY",
    hsrp_state: "STATE",
    hsrp_vip: "VIRTUAL_IP",
    po_name: "BUNDLE_NAME",
    po_protocol: "PROTOCOL",
    po_status: "BUNDLE_STATUS",
    po_members: "MEMBER_INTERFACE",
    po_member_status: "MEMBER_INTERFACE_STATUS",
    rt_vrf: "VRF",
    rt_protocol: "PROTOCOL",
    rt_type: "TYPE",
    rt_network: "NETWORK",
    rt_mask: "PREFIX_LENGTH",
    rt_nh_ip: "NEXTHOP_IP",
    rt_nh_intf: "NEXTHOP_IF",
    acl_name: "ACL_NAME",
    acl_seq: "LINE_NUM",
    acl_action: "ACTION",
    acl_remark: "",
    acl_protocol: "PROTOCOL",
    acl_src_host: "SRC_HOST",
    acl_src_any: "SRC_ANY",
    acl_src_network: "SRC_NETWORK",
    acl_src_mask: "SRC_WILDCARD",
    acl_dst_host: "DST_HOST",
    acl_dst_any: "DST_ANY",
    acl_dst_network: "DST_NETWORK",
    acl_dst_mask: "DST_WILDCARD",
    acl_dst_port: "DST_PORT",
    bgp_peer: "BGP_NEIGH",
    bgp_peer_as: "NEIGH_AS",
    bgp_state: "",
    bgp_pfx_rcv: "STATE_PFXRCD",
    ospf_nbr_id: "NEIGHBOR_ID",
    ospf_nbr_intf: "INTERFACE",
    ospf_nbr_state: "STATE",
    ospf_intf: "INTERFACE",
    ospf_area: "AREA",
    ospf_cost: "COST",
    ospf_nbr_count: "NEIGHBORS_FC",
    cdp_local_intf: "LOCAL_INTERFACE",
    cdp_remote_host: "NEIGHBOR_NAME",
    cdp_remote_port: "NEIGHBOR_INTERFACE",
    lldp_local_intf: "LOCAL_INTERFACE",
    lldp_remote_host: "NEIGHBOR_NAME",
    lldp_remote_port: "NEIGHBOR_PORT_ID",
};

pub static NXOS_KEYS: KeyTable = KeyTable {
    image: "nxos_ver_str",
    mod_num: "modinf",
    mod_model: "model",
    mod_status: "status",
    intf_name: "interface",
    intf_desc: "name",
    intf_status: "state",
    intf_vlan: "vlan",
    intf_duplex: "duplex",
    intf_speed: "speed",
    intf_type: "type",
    ip_intf: "intf-name",
    ip_addr: "prefix",
    ip_mask: "masklen",
    ip_link: "link-state",
    ip_proto: "proto-state",
    swp_intf: "interface",
    swp_mode: "oper_mode",
    swp_access_vlan: "access_vlan",
    swp_native_vlan: "native_vlan",
    swp_trunk_vlans: "trunk_vlans",
    vlan_id: "vlanshowbr-vlanid",
    vlan_name: "vlanshowbr-vlanname",
    vlan_intf: "vlanshowplist-ifidx",
    hsrp_intf: "sh_if_index",
    hsrp_group: "sh_group_num",
    hsrp_priority: "sh_prio",
    hsrp_state: "sh_group_state",
    hsrp_vip: "sh_vip",
    po_name: "port-channel",
    po_protocol: "prtcl",
    po_status: "status",
    po_members: "port",
    po_member_status: "port-status",
    rt_vrf: "VRF",
    rt_protocol: "PROTOCOL",
    rt_type: "TYPE",
    rt_network: "NETWORK",
    rt_mask: "MASK",
    rt_nh_ip: "NEXTHOP_IP",
    rt_nh_intf: "NEXTHOP_IF",
    acl_name: "acl_name",
    acl_seq: "seqno",
    acl_action: "permitdeny",
    acl_remark: "remark",
    acl_protocol: "proto_str",
    acl_src_host: "",
    acl_src_any: "src_any",
    acl_src_network: "src_ip_prefix",
    acl_src_mask: "",
    acl_dst_host: "",
    acl_dst_any: "dest_any",
    acl_dst_network: "dest_ip_prefix",
    acl_dst_mask: "",
    acl_dst_port: "dest_port1",
    bgp_peer: "neighborid",
    bgp_peer_as: "neighboras",
    bgp_state: "state",
    bgp_pfx_rcv: "prefixreceived",
    ospf_nbr_id: "rid",
    ospf_nbr_intf: "intf",
    ospf_nbr_state: "state",
    ospf_intf: "ifname",
    ospf_area: "area",
    ospf_cost: "cost",
    ospf_nbr_count: "nbr_total",
    cdp_local_intf: "intf_id",
    cdp_remote_host: "device_id",
    cdp_remote_port: "port_id",
    lldp_local_intf: "l_port_id",
    lldp_remote_host: "sys_name",
    lldp_remote_port: "port_id",
};

pub static ASA_KEYS: KeyTable = KeyTable {
    image: "VERSION",
    intf_name: "INTERFACE",
    intf_desc: "DESCRIPTION",
    intf_status: "LINK_STATUS",
    intf_duplex: "DUPLEX",
    intf_speed: "SPEED",
    intf_type: "HARDWARE_TYPE",
    ip_intf: "INTERFACE",
    ip_addr: "IP_ADDRESS",
    ip_mask: "NET_MASK",
    ip_link: "LINK_STATUS",
    ip_proto: "PROTOCOL_STATUS",
    po_name: "BUNDLE_NAME",
    po_protocol: "PROTOCOL",
    po_status: "BUNDLE_STATUS",
    po_members: "MEMBER_INTERFACE",
    po_member_status: "MEMBER_INTERFACE_STATUS",
    rt_protocol: "PROTOCOL",
    rt_type: "TYPE",
    rt_network: "NETWORK",
    rt_mask: "NETMASK",
    rt_nh_ip: "NEXTHOP_IP",
    rt_nh_intf: "NEXTHOP_IF",
    acl_name: "ACL_NAME",
    acl_seq: "LINE_NUM",
    acl_action: "ACTION",
    acl_protocol: "PROTOCOL",
    acl_src_host: "SRC_HOST",
    acl_src_any: "SRC_ANY",
    acl_src_network: "SRC_NETWORK",
    acl_src_mask: "SRC_MASK",
    acl_dst_host: "DST_HOST",
    acl_dst_any: "DST_ANY",
    acl_dst_network: "DST_NETWORK",
    acl_dst_mask: "DST_MASK",
    acl_dst_port: "DST_PORT",
    bgp_peer: "BGP_NEIGH",
    bgp_peer_as: "NEIGH_AS",
    bgp_pfx_rcv: "STATE_PFXRCD",
    ospf_nbr_id: "NEIGHBOR_ID",
    ospf_nbr_intf: "INTERFACE",
    ospf_nbr_state: "STATE",
    ..KeyTable::EMPTY
};

pub static WLC_KEYS: KeyTable = KeyTable {
    image: "PRODUCT_VERSION",
    ..KeyTable::EMPTY
};

pub static VIPTELA_KEYS: KeyTable = KeyTable {
    image: "VERSION",
    ..KeyTable::EMPTY
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_by_substring() {
        assert_eq!(Dialect::resolve("cisco_ios"), Some(Dialect::Ios));
        assert_eq!(Dialect::resolve("iosxe"), Some(Dialect::Ios));
        assert_eq!(Dialect::resolve("cisco_nxos_ssh"), Some(Dialect::Nxos));
        assert_eq!(Dialect::resolve("cisco_asa"), Some(Dialect::Asa));
        assert_eq!(Dialect::resolve("cisco_wlc_ssh"), Some(Dialect::Wlc));
        assert_eq!(Dialect::resolve("viptela"), Some(Dialect::Viptela));
        assert_eq!(Dialect::resolve("juniper_junos"), None);
    }

    #[test]
    fn test_composite_handlers_select_nxos() {
        let handlers = ["netmiko", "scrapli", "nxos"];
        assert_eq!(Dialect::from_handlers(handlers), Some(Dialect::Nxos));
        assert_eq!(Dialect::resolve("NXOS_SSH,cisco_ios"), Some(Dialect::Nxos));
    }

    #[test]
    fn test_key_tables_differ_per_dialect() {
        assert_eq!(Dialect::Ios.keys().rt_mask, "PREFIX_LENGTH");
        assert_eq!(Dialect::Nxos.keys().rt_mask, "MASK");
        assert_eq!(Dialect::Asa.keys().rt_mask, "NETMASK");
        assert_eq!(Dialect::Asa.keys().rt_vrf, "");
        assert!(!is_supported(Dialect::Wlc.keys().acl_name));
        assert!(is_supported(Dialect::Asa.keys().intf_name));
    }

    #[test]
    fn test_acl_mask_kind() {
        assert!(Dialect::Ios.acl_mask_is_wildcard());
        assert!(!Dialect::Asa.acl_mask_is_wildcard());
    }
}
