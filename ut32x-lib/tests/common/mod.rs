use ut32x::report::Report;

/// Split packet bytes into 8 byte reports carrying at most `chunk` payload bytes.
pub fn to_reports(dat: &[u8], chunk: usize) -> Vec<[u8; Report::SIZE]> {
    dat.chunks(chunk)
        .map(|c| {
            let mut buf = [0u8; Report::SIZE];
            buf[0] = c.len() as u8;
            buf[1..=c.len()].copy_from_slice(c);
            buf
        })
        .collect()
}

/// Write a capture of back-to-back reports for `packets` to a temporary file.
pub fn capture_file(packets: &[&[u8]], chunk: usize) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    for pkt in packets {
        for report in to_reports(pkt, chunk) {
            file.write_all(&report).expect("failed to write report");
        }
    }
    file.flush().expect("failed to flush capture");
    file
}
