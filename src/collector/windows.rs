//! Windows implementation of event collection using Windows Hooks.
//!
//! Installs low-level keyboard and mouse hooks (SetWindowsHookEx) on a
//! dedicated thread and forwards press and click events, with their raw
//! identity, to the tracker through a bounded channel. Auto-repeated key
//! downs are forwarded as-is; collapsing repeats is the tracker's job.

use crate::collector::types::{InputEvent, KeyId, KeyboardEvent, MouseButton, MouseEvent};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, GetMessageW, SetWindowsHookExW, UnhookWindowsHookEx, HHOOK, KBDLLHOOKSTRUCT,
    WH_KEYBOARD_LL, WH_MOUSE_LL, WM_KEYDOWN, WM_LBUTTONDOWN, WM_MBUTTONDOWN, WM_RBUTTONDOWN,
    WM_SYSKEYDOWN,
};

/// Configuration for which event sources to capture.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub capture_keyboard: bool,
    pub capture_mouse: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            capture_keyboard: true,
            capture_mouse: true,
        }
    }
}

/// The Windows event collector using Windows Hooks.
pub struct WindowsCollector {
    config: CollectorConfig,
    sender: Sender<InputEvent>,
    receiver: Receiver<InputEvent>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl WindowsCollector {
    /// Create a new Windows collector with the given configuration.
    pub fn new(config: CollectorConfig) -> Self {
        // Bounded channel to prevent unbounded memory growth
        let (sender, receiver) = bounded(10_000);

        Self {
            config,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Start capturing events in a background thread.
    ///
    /// Returns an error if the collector is already running.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }

        self.running.store(true, Ordering::SeqCst);

        let sender = self.sender.clone();
        let running = self.running.clone();
        let config = self.config.clone();

        let handle = thread::spawn(move || {
            if let Err(e) = run_hook_loop(sender, running.clone(), config) {
                tracing::error!("Hook loop error: {e}");
            }
            running.store(false, Ordering::SeqCst);
        });

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop capturing events.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            // The thread should exit when running becomes false
            let _ = handle.join();
        }
    }

    /// Check if the collector is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for input events.
    pub fn receiver(&self) -> &Receiver<InputEvent> {
        &self.receiver
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Option<InputEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for WindowsCollector {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Errors that can occur during event collection.
#[derive(Debug)]
pub enum CollectorError {
    AlreadyRunning,
    HookInstallationFailed,
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::AlreadyRunning => write!(f, "Collector is already running"),
            CollectorError::HookInstallationFailed => {
                write!(f, "Failed to install Windows hook")
            }
        }
    }
}

impl std::error::Error for CollectorError {}

// The hook callbacks cannot capture variables; the sender lives in
// thread-local storage of the hook thread.
thread_local! {
    static EVENT_SENDER: std::cell::RefCell<Option<Sender<InputEvent>>> = const { std::cell::RefCell::new(None) };
}

/// Low-level keyboard hook callback.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code >= 0 {
        let kb_struct = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
        let w_param_u32 = w_param.0 as u32;

        // Presses only; releases carry no action
        if matches!(w_param_u32, WM_KEYDOWN | WM_SYSKEYDOWN) {
            let event = InputEvent::Keyboard(KeyboardEvent::new(KeyId(kb_struct.vkCode)));

            EVENT_SENDER.with(|sender| {
                if let Some(ref s) = *sender.borrow() {
                    // Drop instead of blocking when the channel is full
                    let _ = s.try_send(event);
                }
            });
        }
    }

    // Pass the event to the next hook
    CallNextHookEx(HHOOK::default(), n_code, w_param, l_param)
}

/// Low-level mouse hook callback.
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code >= 0 {
        let w_param_u32 = w_param.0 as u32;

        // Button downs are clicks; movement, wheel, and button ups are not
        // actions and are ignored.
        let button = match w_param_u32 {
            WM_LBUTTONDOWN => Some(MouseButton::Left),
            WM_RBUTTONDOWN => Some(MouseButton::Right),
            WM_MBUTTONDOWN => Some(MouseButton::Middle),
            _ => None,
        };

        if let Some(button) = button {
            let event = InputEvent::Mouse(MouseEvent::click(button));

            EVENT_SENDER.with(|sender| {
                if let Some(ref s) = *sender.borrow() {
                    let _ = s.try_send(event);
                }
            });
        }
    }

    // Pass the event to the next hook
    CallNextHookEx(HHOOK::default(), n_code, w_param, l_param)
}

/// Run the Windows hook message loop.
fn run_hook_loop(
    sender: Sender<InputEvent>,
    running: Arc<AtomicBool>,
    config: CollectorConfig,
) -> Result<(), CollectorError> {
    // Store sender in the hook thread's thread-local
    EVENT_SENDER.with(|s| {
        *s.borrow_mut() = Some(sender);
    });

    unsafe {
        // Install hooks based on configuration
        let mut hooks: Vec<HHOOK> = Vec::new();

        if config.capture_keyboard {
            let kb_hook = SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0);
            match kb_hook {
                Ok(hook) => hooks.push(hook),
                Err(_) => {
                    for hook in hooks {
                        let _ = UnhookWindowsHookEx(hook);
                    }
                    return Err(CollectorError::HookInstallationFailed);
                }
            }
        }

        if config.capture_mouse {
            let mouse_hook = SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0);
            match mouse_hook {
                Ok(hook) => hooks.push(hook),
                Err(_) => {
                    for hook in hooks {
                        let _ = UnhookWindowsHookEx(hook);
                    }
                    return Err(CollectorError::HookInstallationFailed);
                }
            }
        }

        // Message loop; the hooks run as part of message retrieval
        let mut msg = windows::Win32::UI::WindowsAndMessaging::MSG::default();
        while running.load(Ordering::SeqCst) {
            let result = GetMessageW(&mut msg, HWND::default(), 0, 0);

            if result.0 == 0 {
                // WM_QUIT received
                break;
            } else if result.0 < 0 {
                break;
            }
        }

        // Unhook before exiting
        for hook in hooks {
            let _ = UnhookWindowsHookEx(hook);
        }
    }

    Ok(())
}

/// Check if the application can install global hooks.
///
/// Low-level hooks generally work without explicit permission but may require
/// appropriate privileges; probing with a temporary hook is the reliable test.
pub fn check_permission() -> bool {
    unsafe {
        let hook_result = SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0);

        if let Ok(hook) = hook_result {
            let _ = UnhookWindowsHookEx(hook);
            true
        } else {
            false
        }
    }
}
