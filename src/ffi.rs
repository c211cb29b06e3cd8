//! C ABI exposed to the managed-runtime host.
//!
//! Failures never cross the boundary as structured errors. They are logged with the
//! libopus diagnostic and reported as sentinel values: `0` for handles, `-1` for sizes
//! and status codes. A `-1` from an encode or decode call means failure, never empty
//! output.

use crate::bridge::OpusBridge;
use crate::config::{BridgeConfig, CollisionPolicy, SessionProfile};
use crate::constants::MAX_PACKET_SIZE;
use crate::error::{Error, Result};
use crate::handle::INVALID_HANDLE;
use crate::lifecycle;
use crate::observer::{ForeignObserver, NotifyFn, ReleaseFn};
use crate::types::{Application, Bitrate, Channels, SampleRate};
use log::{info, warn};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use std::sync::Arc;

const OK: c_int = 0;
const FAILED: c_int = -1;

fn report<T>(operation: &str, result: Result<T>) -> Option<T> {
    result
        .inspect_err(|err| warn!("{operation}: {err}"))
        .ok()
}

fn status(operation: &str, result: Result<()>) -> c_int {
    report(operation, result).map_or(FAILED, |()| OK)
}

unsafe fn bridge_ref<'a>(bridge: *const OpusBridge) -> Result<&'a OpusBridge> {
    unsafe { bridge.as_ref() }.ok_or(Error::InvalidArgument("null bridge"))
}

unsafe fn input<'a, T>(ptr: *const T, len: usize) -> Result<&'a [T]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(Error::InvalidArgument("null input buffer"));
    }
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

unsafe fn session_key(key: *const c_char) -> Result<String> {
    if key.is_null() {
        return Err(Error::InvalidArgument("null session key"));
    }
    unsafe { CStr::from_ptr(key) }
        .to_str()
        .map(str::to_owned)
        .map_err(|_| Error::InvalidArgument("session key is not UTF-8"))
}

unsafe fn output<'a, T>(ptr: *mut T, capacity: usize) -> Result<&'a mut [T]> {
    if capacity == 0 {
        return Ok(&mut []);
    }
    if ptr.is_null() {
        return Err(Error::InvalidArgument("null output buffer"));
    }
    Ok(unsafe { std::slice::from_raw_parts_mut(ptr, capacity) })
}

/// Copy `data` into the caller's buffer and return the element count.
unsafe fn write_output<T: Copy>(data: &[T], out: *mut T, capacity: usize) -> Result<i32> {
    if data.len() > capacity {
        return Err(Error::InvalidArgument("output buffer too small"));
    }
    if !data.is_empty() {
        if out.is_null() {
            return Err(Error::InvalidArgument("null output buffer"));
        }
        unsafe { std::ptr::copy_nonoverlapping(data.as_ptr(), out, data.len()) };
    }
    i32::try_from(data.len()).map_err(|_| Error::InvalidArgument("output too large"))
}

/// Library load hook. Captures the host runtime handle and installs logging.
///
/// Returns `0` on success, `-1` when `runtime` is null, which leaves the observer path
/// inert.
///
/// # Safety
/// `runtime` must stay valid until the library is unloaded.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_on_load(runtime: *mut c_void) -> c_int {
    lifecycle::init_logging();
    let result = lifecycle::capture_runtime(runtime).map(|handle| {
        info!("opus-bridge loaded, runtime {:p}", handle.as_ptr());
    });
    status("on_load", result)
}

/// Create a bridge with the default profile. Free with [`opus_bridge_free`].
#[unsafe(no_mangle)]
pub extern "C" fn opus_bridge_new() -> *mut OpusBridge {
    Box::into_raw(Box::new(OpusBridge::default()))
}

/// Create a bridge whose keyed sessions use the given parameters.
///
/// Returns null when a parameter is unsupported.
#[unsafe(no_mangle)]
pub extern "C" fn opus_bridge_new_with_profile(
    sample_rate: c_int,
    channels: c_int,
    application: c_int,
    bitrate_bps: c_int,
    reject_collisions: bool,
) -> *mut OpusBridge {
    let profile = (|| -> Result<SessionProfile> {
        Ok(SessionProfile {
            sample_rate: SampleRate::try_from(sample_rate)?,
            channels: Channels::try_from(channels)?,
            application: Application::try_from(application)?,
            bitrate: Bitrate::from_raw(bitrate_bps),
            ..SessionProfile::default()
        })
    })();
    let Some(profile) = report("new_with_profile", profile) else {
        return std::ptr::null_mut();
    };
    let collision = if reject_collisions {
        CollisionPolicy::Reject
    } else {
        CollisionPolicy::Replace
    };
    let config = BridgeConfig::default()
        .with_profile(profile)
        .with_collision(collision);
    Box::into_raw(Box::new(OpusBridge::new(config)))
}

/// Destroy a bridge and every codec instance it still owns.
///
/// # Safety
/// `bridge` must come from `opus_bridge_new*` and must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_free(bridge: *mut OpusBridge) {
    if !bridge.is_null() {
        drop(unsafe { Box::from_raw(bridge) });
    }
}

/// Create an encoder. Returns `0` on failure.
///
/// # Safety
/// `bridge` must be a live bridge pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_create_encoder(
    bridge: *const OpusBridge,
    sample_rate: c_int,
    channels: c_int,
    application: c_int,
    bitrate_bps: c_int,
) -> i64 {
    let result = unsafe { bridge_ref(bridge) }.and_then(|bridge| {
        bridge.create_encoder(sample_rate, channels, application, bitrate_bps)
    });
    report("create_encoder", result).map_or(INVALID_HANDLE, |handle| handle.to_raw())
}

/// Create a decoder. Returns `0` on failure.
///
/// # Safety
/// `bridge` must be a live bridge pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_create_decoder(
    bridge: *const OpusBridge,
    sample_rate: c_int,
    channels: c_int,
) -> i64 {
    let result = unsafe { bridge_ref(bridge) }
        .and_then(|bridge| bridge.create_decoder(sample_rate, channels));
    report("create_decoder", result).map_or(INVALID_HANDLE, |handle| handle.to_raw())
}

/// Destroy an encoder. Returns `-1` for unknown or already-released handles.
///
/// # Safety
/// `bridge` must be a live bridge pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_release_encoder(
    bridge: *const OpusBridge,
    handle: i64,
) -> c_int {
    let result = unsafe { bridge_ref(bridge) }.and_then(|bridge| bridge.release_encoder(handle));
    status("release_encoder", result)
}

/// Destroy a decoder. Returns `-1` for unknown or already-released handles.
///
/// # Safety
/// `bridge` must be a live bridge pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_release_decoder(
    bridge: *const OpusBridge,
    handle: i64,
) -> c_int {
    let result = unsafe { bridge_ref(bridge) }.and_then(|bridge| bridge.release_decoder(handle));
    status("release_decoder", result)
}

/// Encode `pcm_len` interleaved samples into `out`. Returns the packet size or `-1`.
///
/// The packet is written straight into `out`; a small `out_cap` lowers the bitrate of
/// this frame instead of losing it. Buffers beyond [`opus_bridge_max_packet_size`] are
/// not used past that size.
///
/// # Safety
/// `bridge` must be a live bridge pointer, `pcm` readable for `pcm_len` samples and
/// `out` writable for `out_cap` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_encode(
    bridge: *const OpusBridge,
    handle: i64,
    pcm: *const i16,
    pcm_len: usize,
    out: *mut u8,
    out_cap: usize,
) -> i32 {
    let result = unsafe { bridge_ref(bridge) }.and_then(|bridge| {
        let pcm = unsafe { input(pcm, pcm_len) }?;
        bridge.encode_into(handle, pcm, unsafe { output(out, out_cap) }?)
    });
    report("encode", result).and_then(|len| i32::try_from(len).ok()).unwrap_or(FAILED)
}

/// Decode `packet_len` bytes into `out`. Returns the interleaved sample count or `-1`.
///
/// # Safety
/// `bridge` must be a live bridge pointer, `packet` readable for `packet_len` bytes and
/// `out` writable for `out_cap` samples.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_decode(
    bridge: *const OpusBridge,
    handle: i64,
    packet: *const u8,
    packet_len: usize,
    out: *mut i16,
    out_cap: usize,
) -> i32 {
    let result = unsafe { bridge_ref(bridge) }
        .and_then(|bridge| bridge.decode(handle, unsafe { input(packet, packet_len) }?))
        .and_then(|pcm| unsafe { write_output(&pcm, out, out_cap) });
    report("decode", result).unwrap_or(FAILED)
}

/// Start an encoder session under a NUL-terminated UTF-8 key.
///
/// # Safety
/// `bridge` must be a live bridge pointer and `key` a valid C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_init_encoder(
    bridge: *const OpusBridge,
    key: *const c_char,
) -> c_int {
    let result = unsafe { bridge_ref(bridge) }
        .and_then(|bridge| bridge.init_encoder(&unsafe { session_key(key) }?));
    status("init_encoder", result)
}

/// Start a decoder session under a NUL-terminated UTF-8 key.
///
/// # Safety
/// `bridge` must be a live bridge pointer and `key` a valid C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_init_decoder(
    bridge: *const OpusBridge,
    key: *const c_char,
) -> c_int {
    let result = unsafe { bridge_ref(bridge) }
        .and_then(|bridge| bridge.init_decoder(&unsafe { session_key(key) }?));
    status("init_decoder", result)
}

/// End the encoder session under `key`.
///
/// # Safety
/// `bridge` must be a live bridge pointer and `key` a valid C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_close_encoder(
    bridge: *const OpusBridge,
    key: *const c_char,
) -> c_int {
    let result = unsafe { bridge_ref(bridge) }
        .and_then(|bridge| bridge.close_encoder(&unsafe { session_key(key) }?));
    status("close_encoder", result)
}

/// End the decoder session under `key`.
///
/// # Safety
/// `bridge` must be a live bridge pointer and `key` a valid C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_close_decoder(
    bridge: *const OpusBridge,
    key: *const c_char,
) -> c_int {
    let result = unsafe { bridge_ref(bridge) }
        .and_then(|bridge| bridge.close_decoder(&unsafe { session_key(key) }?));
    status("close_decoder", result)
}

/// Keyed variant of [`opus_bridge_encode`].
///
/// # Safety
/// As [`opus_bridge_encode`], and `key` must be a valid C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_encode_keyed(
    bridge: *const OpusBridge,
    key: *const c_char,
    pcm: *const i16,
    pcm_len: usize,
    out: *mut u8,
    out_cap: usize,
) -> i32 {
    let result = unsafe { bridge_ref(bridge) }
        .and_then(|bridge| {
            let key = unsafe { session_key(key) }?;
            let pcm = unsafe { input(pcm, pcm_len) }?;
            bridge.encode_keyed_into(&key, pcm, unsafe { output(out, out_cap) }?)
        });
    report("encode_keyed", result).and_then(|len| i32::try_from(len).ok()).unwrap_or(FAILED)
}

/// Keyed variant of [`opus_bridge_decode`].
///
/// # Safety
/// As [`opus_bridge_decode`], and `key` must be a valid C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_decode_keyed(
    bridge: *const OpusBridge,
    key: *const c_char,
    packet: *const u8,
    packet_len: usize,
    out: *mut i16,
    out_cap: usize,
) -> i32 {
    let result = unsafe { bridge_ref(bridge) }
        .and_then(|bridge| {
            let key = unsafe { session_key(key) }?;
            bridge.decode_keyed(&key, unsafe { input(packet, packet_len) }?)
        })
        .and_then(|pcm| unsafe { write_output(&pcm, out, out_cap) });
    report("decode_keyed", result).unwrap_or(FAILED)
}

/// Install a host observer, releasing any previous one.
///
/// The runtime handle captured by [`opus_bridge_on_load`] is bound to the observer now;
/// if the load hook has not run, notifications are skipped.
///
/// # Safety
/// `bridge` must be a live bridge pointer. `notify` and `release` must accept `target`
/// from any thread until `release` has been called.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_set_observer(
    bridge: *const OpusBridge,
    target: *mut c_void,
    notify: Option<NotifyFn>,
    release: Option<ReleaseFn>,
) -> c_int {
    let result = unsafe { bridge_ref(bridge) }.and_then(|bridge| {
        let notify = notify.ok_or(Error::InvalidArgument("null notify callback"))?;
        let observer =
            unsafe { ForeignObserver::new(lifecycle::runtime(), target, notify, release) };
        bridge.set_observer(Arc::new(observer));
        Ok(())
    });
    status("set_observer", result)
}

/// Release the installed observer.
///
/// # Safety
/// `bridge` must be a live bridge pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_unset_observer(bridge: *const OpusBridge) {
    if let Some(bridge) = report("unset_observer", unsafe { bridge_ref(bridge) }) {
        bridge.unset_observer();
    }
}

/// Log a greeting and fire one observer notification.
///
/// # Safety
/// `bridge` must be a live bridge pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_say_hello(bridge: *const OpusBridge) {
    if let Some(bridge) = report("say_hello", unsafe { bridge_ref(bridge) }) {
        bridge.say_hello();
    }
}

/// Interleaved samples per nominal frame of the keyed-session profile, or `-1`.
///
/// # Safety
/// `bridge` must be a live bridge pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opus_bridge_frame_samples(bridge: *const OpusBridge) -> i32 {
    let result = unsafe { bridge_ref(bridge) }.and_then(|bridge| {
        i32::try_from(bridge.config().profile.frame_samples())
            .map_err(|_| Error::InvalidArgument("frame too large"))
    });
    report("frame_samples", result).unwrap_or(FAILED)
}

/// Capacity an encode output buffer needs to hold any packet.
#[unsafe(no_mangle)]
pub extern "C" fn opus_bridge_max_packet_size() -> i32 {
    MAX_PACKET_SIZE as i32
}
