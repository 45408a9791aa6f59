use windows::Win32::Foundation::CloseHandle;
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
    QueryFullProcessImageNameW,
};
use windows::core::PWSTR;

/// Why an image name could not be read.
pub enum ImageNameError {
    /// The process could not be opened (elevated or protected).
    AccessDenied,
    /// The process was opened but its image path could not be read.
    Query(windows::core::Error),
}

/// Returns the executable file name (e.g. `firefox.exe`) of a process.
pub fn image_name(pid: u32) -> Result<String, ImageNameError> {
    // SAFETY: PROCESS_QUERY_LIMITED_INFORMATION is the least-privilege
    // access right that still allows reading the image path.
    let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) }
        .map_err(|_| ImageNameError::AccessDenied)?;

    let mut buffer = [0u16; 1024];
    let mut size = buffer.len() as u32;
    // SAFETY: `buffer` holds `size` UTF-16 units and outlives the call.
    let result = unsafe {
        QueryFullProcessImageNameW(
            handle,
            PROCESS_NAME_WIN32,
            PWSTR(buffer.as_mut_ptr()),
            &mut size,
        )
    };
    // SAFETY: the handle was opened above and is closed exactly once.
    unsafe {
        let _ = CloseHandle(handle);
    }
    result.map_err(ImageNameError::Query)?;

    let path = String::from_utf16_lossy(&buffer[..size as usize]);
    Ok(file_name(&path).to_string())
}

fn file_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}
