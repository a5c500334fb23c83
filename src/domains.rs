use anyhow::{anyhow, Result};

/// Return the default mix of domains used by the stress test.
///
/// Covers the interesting outcomes: names that resolve, a name under a real
/// TLD that does not exist, a reserved TLD (RFC 2606), and a bare IP string
/// that no TLD will delegate.
pub fn default_stress_domains() -> Vec<String> {
	vec![
		"google.com",            // resolves
		"facebook.com",          // resolves
		"nonexistentdomain.xyz", // NXDOMAIN from the .xyz servers
		"example.invalid",       // NXDOMAIN from the root
		"slowwebsite.example",   // reserved TLD, NXDOMAIN from the root
		"198.41.0.4",            // an address, not a name
	].into_iter().map(String::from).collect()
}

/// Read domains from a file, one per line.
///
/// Blank lines and lines starting with '#' are skipped.
pub fn read_domain_file(path: &str) -> Result<Vec<String>> {
	let content = std::fs::read_to_string(path)
		.map_err(|e| anyhow!("failed to read domain file '{}': {}", path, e))?;
	let domains = parse_domain_lines(&content);
	if domains.is_empty() {
		return Err(anyhow!("domain file '{}' contains no domains", path));
	}
	Ok(domains)
}

fn parse_domain_lines(content: &str) -> Vec<String> {
	content.lines()
		.map(|line| line.trim().to_string())
		.filter(|line| !line.is_empty() && !line.starts_with('#'))
		.collect()
}
