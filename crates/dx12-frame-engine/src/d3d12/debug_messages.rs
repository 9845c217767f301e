use tracing::warn;
use windows::Win32::Graphics::Dxgi::*;

fn severity_name(severity: DXGI_INFO_QUEUE_MESSAGE_SEVERITY) -> &'static str {
    match severity {
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_CORRUPTION => "CORRUPTION",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_ERROR => "ERROR",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_WARNING => "WARNING",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_INFO => "INFO",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_MESSAGE => "MESSAGE",
        _ => "UNKNOWN",
    }
}

/// Logs and clears every message stored in the DXGI info queue.
pub fn log_dxgi_debug_messages(queue: &IDXGIInfoQueue) {
    let num_messages = unsafe { queue.GetNumStoredMessages(DXGI_DEBUG_ALL) };
    if num_messages == 0 {
        return;
    }
    warn!("--- DXGI Debug Messages START ---");
    for i in 0..num_messages {
        let mut message_size: usize = 0;
        if unsafe { queue.GetMessage(DXGI_DEBUG_ALL, i, None, &mut message_size) }.is_err() {
            warn!("Error getting size for message {}", i);
            continue;
        }

        // u64 backing keeps the message header aligned.
        let mut message_buffer = vec![0u64; message_size.div_ceil(8)];
        let p_message = message_buffer.as_mut_ptr() as *mut DXGI_INFO_QUEUE_MESSAGE;
        if unsafe { queue.GetMessage(DXGI_DEBUG_ALL, i, Some(p_message), &mut message_size) }.is_err()
        {
            warn!("Error getting message data for message {}", i);
            continue;
        }

        let message = unsafe { &*p_message };
        let description = unsafe {
            std::slice::from_raw_parts(message.pDescription as *const u8, message.DescriptionByteLength)
        };
        let description = String::from_utf8_lossy(description);
        warn!(
            "DXGI Debug [{} ID:{}]: {}",
            severity_name(message.Severity),
            message.ID,
            description.trim_end_matches('\0').trim()
        );
    }
    unsafe { queue.ClearStoredMessages(DXGI_DEBUG_ALL) };
    warn!("--- DXGI Debug Messages END ---");
}
