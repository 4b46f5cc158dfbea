/// Renders `text` as a Rust string literal, escapes included.
pub fn quote(text: &str) -> String {
    format!("{:?}", text)
}

/// Renders bytes as a Rust byte-array literal body, e.g. `[80, 101]`.
pub fn byte_list(bytes: &[u8]) -> String {
    let items: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
    format!("[{}]", items.join(", "))
}
