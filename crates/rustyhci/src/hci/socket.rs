//! HCI Socket implementation for Bluetooth communication
//!
//! This module provides a wrapper around the raw HCI socket interface. A
//! session owns one socket and one background reader thread that hands every
//! received frame to the registered data callback.
//!
//! Sending, device control and filter installation run synchronously on the
//! caller's thread. A callback may send on the socket it is invoked from, but
//! must not close it.

use crate::config::TransportConfig;
use crate::error::HciError;
use crate::gap::BdAddr;
use crate::hci::acl::AclPacket;
use crate::hci::command::HciCommand;
use crate::hci::constants::*;
use crate::hci::filter::HciFilter;
use byteorder::{NativeEndian, ReadBytesExt};
use log::{debug, error, info, warn};
use std::fmt;
use std::io::{self, Cursor};
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Result returned by a data callback. Errors are logged by the reader loop.
pub type CallbackResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Consumer of received frames. Each invocation gets its own copy of the bytes.
pub type DataCallback = dyn Fn(Vec<u8>) -> CallbackResult + Send + Sync + 'static;

const SUBSCRIBER_RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// Identifies one callback registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u64);

// Define the sockaddr_hci structure
#[repr(C)]
struct SockaddrHci {
    hci_family: libc::sa_family_t,
    hci_dev: u16,
    hci_channel: u16,
}

/// Subset of `struct hci_dev_info` returned by [`HciSocket::device_info`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: u16,
    pub name: String,
    pub address: BdAddr,
    pub flags: u32,
}

impl DeviceInfo {
    // HCI_UP is bit 0 of the device flags
    pub fn is_up(&self) -> bool {
        self.flags & 1 != 0
    }

    fn parse(buffer: &[u8]) -> Result<Self, HciError> {
        if buffer.len() < 20 {
            return Err(HciError::Truncated {
                needed: 20,
                actual: buffer.len(),
            });
        }

        let mut cursor = Cursor::new(buffer);
        let id = cursor.read_u16::<NativeEndian>()?;
        let name_bytes = &buffer[2..10];
        let name_len = name_bytes.iter().position(|&b| b == 0).unwrap_or(name_bytes.len());
        let name = String::from_utf8_lossy(&name_bytes[..name_len]).into_owned();
        let address = BdAddr::from_slice(&buffer[10..16]).unwrap_or_default();
        cursor.set_position(16);
        let flags = cursor.read_u32::<NativeEndian>()?;

        Ok(Self {
            id,
            name,
            address,
            flags,
        })
    }
}

struct Registration {
    id: u64,
    callback: Arc<DataCallback>,
}

/// State shared between the caller and the reader thread
struct Shared {
    fd: RwLock<Option<OwnedFd>>,
    running: AtomicBool,
    callback: Mutex<Option<Registration>>,
    next_callback_id: AtomicU64,
}

impl Shared {
    fn callback_slot(&self) -> MutexGuard<'_, Option<Registration>> {
        self.callback.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_callback(&self) -> Option<Arc<DataCallback>> {
        self.callback_slot()
            .as_ref()
            .map(|registration| Arc::clone(&registration.callback))
    }

    fn recv(&self, buffer: &mut [u8]) -> Result<usize, HciError> {
        let guard = self.fd.read().unwrap_or_else(PoisonError::into_inner);
        let fd = guard.as_ref().ok_or(HciError::Closed)?;

        let received = unsafe {
            libc::recv(
                fd.as_raw_fd(),
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
                0,
            )
        };

        if received < 0 {
            return Err(HciError::Io(io::Error::last_os_error()));
        }
        Ok(received as usize)
    }
}

/// Represents an open HCI socket session
pub struct HciSocket {
    dev_id: u16,
    shared: Arc<Shared>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for HciSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HciSocket")
            .field("dev_id", &self.dev_id)
            .field("fd", &self.as_raw_fd())
            .field("running", &self.shared.running.load(Ordering::Acquire))
            .finish()
    }
}

impl HciSocket {
    /// Opens a new HCI socket with the default configuration
    ///
    /// # Arguments
    ///
    /// * `dev_id` - The device ID to open (0 for the first device)
    ///
    /// # Returns
    ///
    /// A new `HciSocket` instance with its reader running, or
    /// `HciError::DeviceUnavailable` if the device could not be bound
    pub fn open(dev_id: u16) -> Result<Self, HciError> {
        Self::open_with_config(dev_id, TransportConfig::default())
    }

    /// Opens a new HCI socket
    pub fn open_with_config(dev_id: u16, config: TransportConfig) -> Result<Self, HciError> {
        config.validate()?;

        // Open a raw HCI socket
        let fd = unsafe {
            libc::socket(
                AF_BLUETOOTH,
                libc::SOCK_RAW | libc::SOCK_CLOEXEC,
                BTPROTO_HCI,
            )
        };

        if fd < 0 {
            return Err(HciError::SocketError(io::Error::last_os_error()));
        }
        // The descriptor is closed on every early return from here on
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };

        // Bind to the specified device
        let addr = SockaddrHci {
            hci_family: AF_BLUETOOTH as libc::sa_family_t,
            hci_dev: dev_id,
            hci_channel: HCI_CHANNEL_RAW,
        };

        let result = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                &addr as *const _ as *const libc::sockaddr,
                std::mem::size_of::<SockaddrHci>() as libc::socklen_t,
            )
        };

        if result < 0 {
            return Err(HciError::DeviceUnavailable {
                dev_id,
                source: io::Error::last_os_error(),
            });
        }

        let socket = Self::from_fd(dev_id, fd, config)?;
        info!("Opened HCI device {}", dev_id);
        Ok(socket)
    }

    /// Starts a session on an already connected packet socket
    pub(crate) fn from_fd(dev_id: u16, fd: OwnedFd, config: TransportConfig) -> Result<Self, HciError> {
        config.validate()?;
        set_recv_timeout(fd.as_raw_fd(), config.recv_timeout)?;
        if let Some(filter) = &config.filter {
            apply_filter(fd.as_raw_fd(), filter)?;
        }

        let shared = Arc::new(Shared {
            fd: RwLock::new(Some(fd)),
            running: AtomicBool::new(true),
            callback: Mutex::new(None),
            next_callback_id: AtomicU64::new(1),
        });

        let reader_shared = Arc::clone(&shared);
        let buffer_size = config.recv_buffer_size;
        let reader = thread::Builder::new()
            .name(config.reader_thread_name)
            .spawn(move || read_loop(reader_shared, buffer_size))?;

        Ok(Self {
            dev_id,
            shared,
            reader: Mutex::new(Some(reader)),
        })
    }

    /// The controller index this session is bound to
    pub fn dev_id(&self) -> u16 {
        self.dev_id
    }

    /// Gets the raw file descriptor for the socket, if still open
    pub fn as_raw_fd(&self) -> Option<RawFd> {
        self.shared
            .fd
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|fd| fd.as_raw_fd())
    }

    /// `false` once the socket is closed or the reader has stopped on its own
    /// (end of stream or a receive error)
    pub fn is_open(&self) -> bool {
        self.shared.running.load(Ordering::Acquire) && self.as_raw_fd().is_some()
    }

    /// Stops the reader loop and closes the socket.
    ///
    /// Waits for the reader thread to finish, so no callback is running or
    /// will start once this returns. The wait is bounded by the configured
    /// receive timeout plus the duration of an in-flight callback. Closing
    /// an already closed socket does nothing.
    pub fn close(&self) {
        self.shared.running.store(false, Ordering::Release);

        let reader = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = reader {
            if handle.thread().id() == thread::current().id() {
                warn!("HCI socket closed from its own data callback");
            } else if handle.join().is_err() {
                error!("HCI reader thread for device {} panicked", self.dev_id);
            }
        }

        let fd = self
            .shared
            .fd
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if fd.is_some() {
            info!("Closed HCI device {}", self.dev_id);
        }

        // A callback holding a reference to this socket would otherwise keep it alive
        let registration = self.shared.callback_slot().take();
        drop(registration);
    }

    /// Writes a complete frame to the controller
    pub fn send(&self, bytes: &[u8]) -> Result<(), HciError> {
        let guard = self.shared.fd.read().unwrap_or_else(PoisonError::into_inner);
        let fd = guard.as_ref().ok_or(HciError::Closed)?;

        let written = unsafe {
            libc::send(
                fd.as_raw_fd(),
                bytes.as_ptr() as *const libc::c_void,
                bytes.len(),
                libc::MSG_NOSIGNAL,
            )
        };

        if written < 0 {
            return Err(HciError::Io(io::Error::last_os_error()));
        }
        if written as usize != bytes.len() {
            return Err(HciError::Io(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", written, bytes.len()),
            )));
        }
        Ok(())
    }

    /// Sends an HCI command to the controller
    pub fn send_command(&self, command: &HciCommand) -> Result<(), HciError> {
        debug!("Sending HCI command {:#06x}", command.opcode());
        self.send(&command.to_packet())
    }

    /// Sends an ATT payload over the given connection
    pub fn write_acl_data(&self, handle: u16, payload: &[u8]) -> Result<(), HciError> {
        let packet = AclPacket::new(handle, payload.to_vec()).to_packet()?;
        self.send(&packet)
    }

    /// Performs a device-control request with an in/out buffer.
    ///
    /// The buffer layout is defined by the request; the kernel may write
    /// results back into it. Buffers shorter than the size known for the
    /// request are rejected with `HciError::BufferTooSmall`.
    ///
    /// # Safety
    ///
    /// The kernel writes as many bytes as the request's own structure needs,
    /// which for HCI requests is not always the size encoded in the request
    /// code. For requests other than the ones defined in
    /// [`constants`](crate::hci::constants), `buffer` must be at least as
    /// large as the structure the kernel copies out.
    pub unsafe fn control(&self, request: libc::c_ulong, buffer: &mut [u8]) -> Result<(), HciError> {
        let needed = control_buffer_len(request);
        if buffer.len() < needed {
            return Err(HciError::BufferTooSmall {
                needed,
                actual: buffer.len(),
            });
        }

        let guard = self.shared.fd.read().unwrap_or_else(PoisonError::into_inner);
        let fd = guard.as_ref().ok_or(HciError::Closed)?;

        let result = libc::ioctl(fd.as_raw_fd(), request as _, buffer.as_mut_ptr());
        if result < 0 {
            return Err(HciError::Io(io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Performs a device-control request that takes an integer argument
    pub fn control_value(&self, request: libc::c_ulong, value: libc::c_ulong) -> Result<(), HciError> {
        let guard = self.shared.fd.read().unwrap_or_else(PoisonError::into_inner);
        let fd = guard.as_ref().ok_or(HciError::Closed)?;

        let result = unsafe { libc::ioctl(fd.as_raw_fd(), request as _, value) };
        if result < 0 {
            return Err(HciError::Io(io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Brings the device up. A device that is already up is not an error.
    pub fn device_up(&self) -> Result<(), HciError> {
        match self.control_value(HCIDEVUP, self.dev_id as libc::c_ulong) {
            Err(HciError::Io(e)) if e.raw_os_error() == Some(libc::EALREADY) => Ok(()),
            result => result,
        }
    }

    /// Brings the device down
    pub fn device_down(&self) -> Result<(), HciError> {
        self.control_value(HCIDEVDOWN, self.dev_id as libc::c_ulong)
    }

    /// Queries the controller's identity
    pub fn device_info(&self) -> Result<DeviceInfo, HciError> {
        let mut buffer = [0u8; HCI_DEV_INFO_SIZE];
        buffer[..2].copy_from_slice(&self.dev_id.to_ne_bytes());
        // The buffer covers the whole of struct hci_dev_info
        unsafe { self.control(HCIGETDEVINFO, &mut buffer)? };
        DeviceInfo::parse(&buffer)
    }

    /// Installs a kernel-side filter; only matching frames reach this socket
    pub fn set_filter(&self, filter: &HciFilter) -> Result<(), HciError> {
        let guard = self.shared.fd.read().unwrap_or_else(PoisonError::into_inner);
        let fd = guard.as_ref().ok_or(HciError::Closed)?;
        apply_filter(fd.as_raw_fd(), filter)
    }

    /// Installs a filter given as its raw masks
    pub fn set_filter_masks(
        &self,
        type_mask: u32,
        event_mask1: u32,
        event_mask2: u32,
        opcode: u16,
    ) -> Result<(), HciError> {
        self.set_filter(&HciFilter::from_masks(type_mask, event_mask1, event_mask2, opcode))
    }

    /// Registers the callback that receives every frame, replacing any
    /// previous one.
    pub fn register_data_callback<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(Vec<u8>) -> CallbackResult + Send + Sync + 'static,
    {
        let id = self.shared.next_callback_id.fetch_add(1, Ordering::Relaxed);
        let previous = self.shared.callback_slot().replace(Registration {
            id,
            callback: Arc::new(callback),
        });
        if previous.is_some() {
            debug!("Replaced HCI data callback");
        }
        CallbackHandle(id)
    }

    /// Removes the callback if `handle` is still the registered one
    pub fn unregister(&self, handle: CallbackHandle) -> bool {
        let mut slot = self.shared.callback_slot();
        match slot.as_ref() {
            Some(registration) if registration.id == handle.0 => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Removes whatever callback is registered
    pub fn clear_data_callback(&self) {
        self.shared.callback_slot().take();
    }

    /// Delivers frames through a bounded channel instead of a callback.
    ///
    /// Replaces any registered callback. While the channel is full the reader
    /// waits for room; a frame still waiting when the session closes is
    /// dropped.
    pub fn subscribe(&self, depth: usize) -> Receiver<Vec<u8>> {
        let (tx, rx) = mpsc::sync_channel(depth);
        let shared = Arc::downgrade(&self.shared);
        self.register_data_callback(move |mut frame| {
            loop {
                match tx.try_send(frame) {
                    Ok(()) => return Ok(()),
                    Err(TrySendError::Disconnected(_)) => return Err("subscriber dropped".into()),
                    Err(TrySendError::Full(rejected)) => {
                        let running = shared
                            .upgrade()
                            .is_some_and(|shared| shared.running.load(Ordering::Acquire));
                        if !running {
                            debug!("Dropping frame for full subscriber on close");
                            return Ok(());
                        }
                        frame = rejected;
                        thread::sleep(SUBSCRIBER_RETRY_INTERVAL);
                    }
                }
            }
        });
        rx
    }
}

impl Drop for HciSocket {
    fn drop(&mut self) {
        self.close();
    }
}

fn control_buffer_len(request: libc::c_ulong) -> usize {
    match request {
        HCIGETDEVINFO => HCI_DEV_INFO_SIZE,
        _ => ioc_size(request),
    }
}

fn set_recv_timeout(fd: RawFd, timeout: Duration) -> Result<(), HciError> {
    let timeout = libc::timeval {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };

    let result = unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_RCVTIMEO,
            &timeout as *const libc::timeval as *const libc::c_void,
            std::mem::size_of::<libc::timeval>() as libc::socklen_t,
        )
    };

    if result < 0 {
        return Err(HciError::Io(io::Error::last_os_error()));
    }
    Ok(())
}

fn apply_filter(fd: RawFd, filter: &HciFilter) -> Result<(), HciError> {
    let result = unsafe {
        libc::setsockopt(
            fd,
            SOL_HCI,
            HCI_FILTER,
            filter as *const HciFilter as *const libc::c_void,
            std::mem::size_of::<HciFilter>() as libc::socklen_t,
        )
    };

    if result < 0 {
        return Err(HciError::Io(io::Error::last_os_error()));
    }
    Ok(())
}

/// Background receive loop. The stop flag is checked each time a receive
/// returns, including on timeout.
fn read_loop(shared: Arc<Shared>, buffer_size: usize) {
    let mut buffer = vec![0u8; buffer_size];

    while shared.running.load(Ordering::Acquire) {
        let len = match shared.recv(&mut buffer) {
            Ok(0) => {
                info!("HCI socket reached end of stream");
                break;
            }
            Ok(len) => len,
            Err(HciError::Io(e))
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                continue
            }
            Err(HciError::Closed) => break,
            Err(e) => {
                error!("HCI receive failed: {}", e);
                break;
            }
        };

        if !shared.running.load(Ordering::Acquire) {
            break;
        }

        debug!("Received {} byte HCI frame", len);
        let Some(callback) = shared.current_callback() else {
            continue;
        };

        let frame = buffer[..len].to_vec();
        match panic::catch_unwind(AssertUnwindSafe(|| callback(frame))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("HCI data callback failed: {}", e),
            Err(_) => error!("HCI data callback panicked"),
        }
    }

    shared.running.store(false, Ordering::Release);
    debug!("HCI reader loop stopped");
}
