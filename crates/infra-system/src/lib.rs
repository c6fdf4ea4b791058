// NetGuard Infrastructure - System Adapters
// Implements: ConnectivityProbe, AdapterController, EventSink

pub mod adapter_command;
pub mod adapter_inventory;
pub mod event_dispatch;
pub mod notifier;
pub mod ping_probe;
pub mod privilege;
pub mod tcp_probe;

pub use adapter_command::{CommandAdapterController, CommandTemplate};
pub use adapter_inventory::{AdapterInfo, AdapterInventory};
pub use event_dispatch::{event_channel, ChannelEventSink, EventDispatcher, LogHistory};
pub use notifier::{DesktopNotifier, LogOnlyNotifier, Notifier};
pub use ping_probe::PingProbe;
pub use privilege::has_adapter_privileges;
pub use tcp_probe::TcpConnectProbe;
