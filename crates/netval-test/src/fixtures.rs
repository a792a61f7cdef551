//! Test fixtures for common normalization scenarios
//!
//! Canned command output per dialect, shaped the way the collectors hand
//! it over: parsed records, raw text blocks or decoded `| json` documents.

use std::collections::BTreeMap;

use netval_common::{CommandOutput, RawOutput, Record};
use serde_json::Value;

/// Builds a `feature -> sub-feature -> output` collection.
#[derive(Debug, Clone, Default)]
pub struct DeviceOutputs {
    features: BTreeMap<String, BTreeMap<String, CommandOutput>>,
}

impl DeviceOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sub-feature's output, replacing any earlier one
    pub fn with(
        mut self,
        feature: impl Into<String>,
        sub_feature: impl Into<String>,
        output: CommandOutput,
    ) -> Self {
        self.features
            .entry(feature.into())
            .or_default()
            .insert(sub_feature.into(), output);
        self
    }

    /// Number of sub-feature outputs collected so far
    pub fn len(&self) -> usize {
        self.features.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn build(self) -> BTreeMap<String, BTreeMap<String, CommandOutput>> {
        self.features
    }
}

/// Wrap parsed records as a list of items
pub fn items(records: Vec<Record>) -> RawOutput {
    RawOutput::Items(records.into_iter().map(Value::Object).collect())
}

/// Output that carries nothing at all
pub fn empty_output(command: &str) -> CommandOutput {
    CommandOutput::new(command, RawOutput::Items(Vec::new()))
}

/// IOS / IOS-XE output
pub mod ios {
    use super::*;
    use netval_common::record;

    pub const DIALECT: &str = "cisco_ios";

    pub fn show_version() -> CommandOutput {
        CommandOutput::new(
            "show version",
            items(vec![record! { "VERSION" => "17.3.4a", "HOSTNAME" => "core-rtr-01" }]),
        )
    }

    /// Remarks at sequence 10 and 30 around three real entries
    pub fn access_list_with_remarks() -> CommandOutput {
        CommandOutput::new(
            "show ip access-lists",
            items(vec![
                record! { "ACL_NAME" => "EDGE-IN", "LINE_NUM" => "10", "ACTION" => "remark" },
                record! {
                    "ACL_NAME" => "EDGE-IN", "LINE_NUM" => "20", "ACTION" => "permit",
                    "PROTOCOL" => "tcp", "SRC_NETWORK" => "10.0.0.0", "SRC_WILDCARD" => "0.0.0.255",
                    "DST_ANY" => "any", "DST_PORT" => "443"
                },
                record! { "ACL_NAME" => "EDGE-IN", "LINE_NUM" => "30", "ACTION" => "remark" },
                record! {
                    "ACL_NAME" => "EDGE-IN", "LINE_NUM" => "40", "ACTION" => "permit",
                    "PROTOCOL" => "udp", "SRC_HOST" => "192.0.2.10", "DST_ANY" => "any",
                    "DST_PORT" => "53"
                },
                record! {
                    "ACL_NAME" => "EDGE-IN", "LINE_NUM" => "50", "ACTION" => "deny",
                    "PROTOCOL" => "ip", "SRC_ANY" => "any", "DST_ANY" => "any"
                },
            ]),
        )
    }

    /// Route table text with a subnetted header, a continuation row and a
    /// multi-path prefix
    pub fn route_text() -> CommandOutput {
        CommandOutput::text(
            "show ip route",
            "\
Codes: L - local, C - connected, S - static, R - RIP, M - mobile, B - BGP
       O - OSPF, IA - OSPF inter area
Gateway of last resort is 10.0.0.1 to network 0.0.0.0

S*    0.0.0.0/0 [1/0] via 10.0.0.1
      10.0.0.0/8 is variably subnetted, 2 subnets, 2 masks
C        10.0.0.0/24 is directly connected, GigabitEthernet0/0
L        10.0.0.2/32 is directly connected, GigabitEthernet0/0
      172.16.0.0/24 is subnetted, 2 subnets
O IA     172.16.1.0 [110/2] via 10.0.0.5, 00:01:02, GigabitEthernet0/0
                    [110/2] via 10.0.0.6, 00:01:02, GigabitEthernet0/1
O IA     172.16.2.0 [110/3] via 10.0.0.5, 00:01:02, GigabitEthernet0/0
",
        )
    }

    /// The same next-hop pattern as parsed records: A, B, then A again
    pub fn route_records_repeating_hop() -> CommandOutput {
        let route = |nh: &str| {
            record! {
                "VRF" => "", "PROTOCOL" => "B", "TYPE" => "", "NETWORK" => "10.0.0.0",
                "PREFIX_LENGTH" => "24", "NEXTHOP_IP" => nh, "NEXTHOP_IF" => ""
            }
        };
        CommandOutput::new(
            "show ip route",
            items(vec![route("192.0.2.1"), route("192.0.2.2"), route("192.0.2.1")]),
        )
    }

    pub fn interface_status() -> CommandOutput {
        CommandOutput::new(
            "show interfaces status",
            items(vec![
                record! {
                    "PORT" => "Gi1/0/1", "NAME" => "uplink", "STATUS" => "connected",
                    "VLAN_ID" => "trunk", "DUPLEX" => "a-full", "SPEED" => "a-1000",
                    "TYPE" => "10/100/1000BaseTX"
                },
                record! {
                    "PORT" => "Gi1/0/2", "NAME" => "", "STATUS" => "notconnect",
                    "VLAN_ID" => "10", "DUPLEX" => "auto", "SPEED" => "auto",
                    "TYPE" => "10/100/1000BaseTX"
                },
            ]),
        )
    }

    pub fn mac_address_count() -> CommandOutput {
        CommandOutput::text(
            "show mac address-table count",
            "\
Mac Entries for Vlan 10:
---------------------------
Dynamic Address Count  : 7
Static  Address Count  : 0
Total Mac Addresses    : 7

Mac Entries for Vlan 20:
---------------------------
Dynamic Address Count  : 3
Static  Address Count  : 1
Total Mac Addresses    : 4

Total Mac Addresses for this criterion: 11
",
        )
    }

    pub fn bgp_summary() -> CommandOutput {
        CommandOutput::new(
            "show ip bgp summary",
            items(vec![
                record! { "BGP_NEIGH" => "192.0.2.1", "NEIGH_AS" => "65010", "STATE_PFXRCD" => "45" },
                record! { "BGP_NEIGH" => "192.0.2.5", "NEIGH_AS" => "65011", "STATE_PFXRCD" => "Idle" },
            ]),
        )
    }

    pub fn ip_sla_summary() -> CommandOutput {
        CommandOutput::new(
            "show ip sla summary",
            items(vec![
                record! {
                    "ID" => "*10", "TYPE" => "icmp-echo", "DESTINATION" => "8.8.8.8",
                    "STATE" => "OK", "RTT" => "3"
                },
                record! {
                    "ID" => "20", "TYPE" => "udp-jitter", "DESTINATION" => "10.0.0.9",
                    "STATE" => "Timeout", "RTT" => "-"
                },
            ]),
        )
    }
}

/// NX-OS `| json` output
pub mod nxos {
    use super::*;
    use netval_common::record;
    use serde_json::json;

    pub const DIALECT: &str = "cisco_nxos";

    fn neighbor_rows(rows: Value) -> Record {
        record! {
            "TABLE_vrf" => {"ROW_vrf": {
                "vrf-name-out": "default",
                "TABLE_af": {"ROW_af": {
                    "af-id": 1,
                    "TABLE_saf": {"ROW_saf": {
                        "safi": 1,
                        "TABLE_neighbor": {"ROW_neighbor": rows}
                    }}
                }}
            }}
        }
    }

    /// One BGP neighbor, its row delivered as a bare mapping
    pub fn bgp_summary_singleton() -> CommandOutput {
        CommandOutput::new(
            "show bgp ipv4 unicast summary | json",
            RawOutput::Record(neighbor_rows(json!({
                "neighborid": "10.0.0.1", "neighboras": "65001",
                "state": "Established", "prefixreceived": "12"
            }))),
        )
    }

    /// The same neighbor delivered as a one-element sequence
    pub fn bgp_summary_sequence() -> CommandOutput {
        CommandOutput::new(
            "show bgp ipv4 unicast summary | json",
            RawOutput::Record(neighbor_rows(json!([{
                "neighborid": "10.0.0.1", "neighboras": "65001",
                "state": "Established", "prefixreceived": "12"
            }]))),
        )
    }

    pub fn access_list_with_remark() -> CommandOutput {
        CommandOutput::new(
            "show ip access-lists | json",
            RawOutput::Record(record! {
                "TABLE_ip_ipv6_mac" => {"ROW_ip_ipv6_mac": {
                    "acl_name": "VTY",
                    "TABLE_seqno": {"ROW_seqno": [
                        {"seqno": 10, "remark": "jump hosts"},
                        {"seqno": 20, "permitdeny": "permit", "proto_str": "tcp",
                         "src_ip_prefix": "10.1.1.0/24", "dest_any": "any"},
                        {"seqno": 30, "permitdeny": "deny", "proto_str": "ip",
                         "src_any": "any", "dest_any": "any"}
                    ]}
                }}
            }),
        )
    }

    pub fn port_channel_summary() -> CommandOutput {
        CommandOutput::new(
            "show port-channel summary | json",
            RawOutput::Record(record! {
                "TABLE_channel" => {"ROW_channel": [
                    {"port-channel": "port-channel10", "prtcl": "LACP", "status": "U",
                     "TABLE_member": {"ROW_member": [
                        {"port": "Ethernet1/49", "port-status": "P"},
                        {"port": "Ethernet1/50", "port-status": "P"}
                     ]}},
                    {"port-channel": "port-channel20", "prtcl": "LACP", "status": "U",
                     "TABLE_member": {"ROW_member": {"port": "Ethernet1/1", "port-status": "D"}}}
                ]}
            }),
        )
    }

    pub fn nve_peers() -> CommandOutput {
        CommandOutput::new(
            "show nve peers | json",
            RawOutput::Record(record! {
                "TABLE_nve_peers" => {"ROW_nve_peers": [
                    {"if-name": "nve1", "peer-ip": "192.0.2.11", "peer-state": "Up", "learn-type": "CP"},
                    {"if-name": "nve1", "peer-ip": "192.0.2.12", "peer-state": "Down", "learn-type": "CP"}
                ]}
            }),
        )
    }

    pub fn mac_ip_routes() -> CommandOutput {
        CommandOutput::new(
            "show l2route evpn mac-ip all | json",
            RawOutput::Record(record! {
                "TABLE_l2route_mac_ip_all" => {"ROW_l2route_mac_ip_all": [
                    {"topo-id": 100, "mac-addr": "0050.56a1.0001", "host-ip": "10.100.0.11", "next-hop1": "Local"},
                    {"topo-id": 100, "mac-addr": "0050.56a1.0002", "host-ip": "10.100.0.12", "next-hop1": "192.0.2.11"},
                    {"topo-id": 200, "mac-addr": "0050.56a1.0003", "host-ip": "10.200.0.5", "next-hop1": "Local"}
                ]}
            }),
        )
    }

    pub fn nve_vnis() -> CommandOutput {
        CommandOutput::new(
            "show nve vni | json",
            RawOutput::Record(record! {
                "TABLE_nve_vni" => {"ROW_nve_vni": [
                    {"if-name": "nve1", "vni": "10100", "vni-state": "Up", "type": "L2 [100]"},
                    {"if-name": "nve1", "vni": "50001", "vni-state": "Up", "type": "L3 [tenant-a]"}
                ]}
            }),
        )
    }
}

/// ASA output
pub mod asa {
    use super::*;
    use netval_common::record;

    pub const DIALECT: &str = "cisco_asa";

    pub fn route_records() -> CommandOutput {
        CommandOutput::new(
            "show route",
            items(vec![
                record! {
                    "PROTOCOL" => "S", "TYPE" => "", "NETWORK" => "0.0.0.0", "NETMASK" => "0.0.0.0",
                    "NEXTHOP_IP" => "203.0.113.1", "NEXTHOP_IF" => "outside"
                },
                record! {
                    "PROTOCOL" => "C", "TYPE" => "", "NETWORK" => "203.0.113.0",
                    "NETMASK" => "255.255.255.248", "NEXTHOP_IP" => "", "NEXTHOP_IF" => "outside"
                },
            ]),
        )
    }

    pub fn interfaces() -> CommandOutput {
        CommandOutput::new(
            "show interface",
            items(vec![
                record! {
                    "INTERFACE" => "GigabitEthernet0/0", "INTERFACE_ZONE" => "outside",
                    "LINK_STATUS" => "up", "PROTOCOL_STATUS" => "up",
                    "HARDWARE_TYPE" => "i82546GB rev03", "DUPLEX" => "Full-duplex",
                    "SPEED" => "1000 Mbps", "DESCRIPTION" => "ISP uplink"
                },
                record! {
                    "INTERFACE" => "Management0/0", "INTERFACE_ZONE" => "management",
                    "LINK_STATUS" => "down", "PROTOCOL_STATUS" => "down",
                    "HARDWARE_TYPE" => "i82546GB rev03", "DUPLEX" => "Auto-duplex",
                    "SPEED" => "Auto-Speed", "DESCRIPTION" => ""
                },
            ]),
        )
    }

    pub fn anyconnect_sessions() -> CommandOutput {
        CommandOutput::new(
            "show vpn-sessiondb anyconnect",
            items(vec![
                record! { "USERNAME" => "alice", "PUBLIC_IP" => "203.0.113.50" },
                record! { "USERNAME" => "bob", "PUBLIC_IP" => "203.0.113.51" },
            ]),
        )
    }

    pub fn l2l_sessions() -> CommandOutput {
        CommandOutput::new(
            "show vpn-sessiondb l2l",
            items(vec![record! {
                "CONNECTION" => "branch-01", "IP_ADDRESS" => "198.51.100.7",
                "PROTOCOL" => "IKEv2 IPsec", "ENCRYPTION" => "AES256",
                "BYTES_TX" => "1048576", "BYTES_RX" => "2097152"
            }]),
        )
    }
}

/// Wireless LAN controller output
pub mod wlc {
    use super::*;
    use netval_common::record;

    pub const DIALECT: &str = "cisco_wlc_ssh";

    pub fn client_summary() -> CommandOutput {
        CommandOutput::text(
            "show client summary",
            "\
WLAN Identifier.................................. 1
Number of Clients................................ 12
WLAN Identifier.................................. 2
Number of Clients................................ 3

Number of Clients................................ 15
",
        )
    }

    pub fn wlan_summary() -> CommandOutput {
        CommandOutput::new(
            "show wlan summary",
            items(vec![record! {
                "WLAN_ID" => "1", "PROFILE" => "corp", "SSID" => "corp-wifi",
                "STATUS" => "Enabled", "INTERFACE_NAME" => "management"
            }]),
        )
    }
}

/// Viptela / vEdge output
pub mod viptela {
    use super::*;
    use netval_common::record;

    pub const DIALECT: &str = "viptela";

    pub fn bfd_sessions() -> CommandOutput {
        CommandOutput::new(
            "show bfd sessions",
            items(vec![
                record! {
                    "SYSTEM_IP" => "10.255.0.2", "SITE_ID" => "200", "STATE" => "up",
                    "SOURCE_TLOC_COLOR" => "mpls", "REMOTE_TLOC_COLOR" => "mpls"
                },
                record! {
                    "SYSTEM_IP" => "10.255.0.2", "SITE_ID" => "200", "STATE" => "down",
                    "SOURCE_TLOC_COLOR" => "biz-internet", "REMOTE_TLOC_COLOR" => "public-internet"
                },
            ]),
        )
    }

    pub fn endpoint_trackers() -> CommandOutput {
        CommandOutput::new(
            "show endpoint-tracker",
            items(vec![record! {
                "INTERFACE" => "ge0/0",
                "TRACKER_NAME" => "dns-probe, web-probe",
                "STATUS" => "UP, DOWN",
                "RTT" => "11.5, 240"
            }]),
        )
    }
}
