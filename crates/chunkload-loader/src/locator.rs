/// Resolve a partition id to its fetch URL: `endpoint + "/" + partition`.
///
/// A trailing slash on the endpoint or a leading slash on the partition id
/// does not produce a double slash.
pub fn partition_url(endpoint: &str, partition: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        partition.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_with_a_single_slash() {
        assert_eq!(partition_url("https://h/schools", "06.csv"), "https://h/schools/06.csv");
        assert_eq!(partition_url("https://h/schools/", "/06.csv"), "https://h/schools/06.csv");
    }
}
