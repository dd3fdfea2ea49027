pub fn prettyprint_usize(x: usize) -> String {
    let num = format!("{}", x);
    let mut result = String::new();
    let mut i = num.len();
    for c in num.chars() {
        result.push(c);
        i -= 1;
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
    }
    result
}

/// The file name without directories or the extension. Empty if there's no file name.
pub fn basename<I: AsRef<str>>(path: I) -> String {
    std::path::Path::new(path.as_ref())
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commas() {
        assert_eq!(prettyprint_usize(0), "0");
        assert_eq!(prettyprint_usize(999), "999");
        assert_eq!(prettyprint_usize(1000), "1,000");
        assert_eq!(prettyprint_usize(1234567), "1,234,567");
    }

    #[test]
    fn basenames() {
        assert_eq!(basename("output_results/SF_points.shp"), "SF_points");
        assert_eq!(basename("boundary.geojson"), "boundary");
        assert_eq!(basename(""), "");
    }
}
