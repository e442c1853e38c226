//! `yga resources` – list the resource registry.

use anyhow::Result;
use yga_core::Resource;

pub fn run_resources() -> Result<()> {
    println!("{:<16} {:<8} {}", "NAME", "API", "PATH");
    for r in Resource::ALL {
        let path = match r.path_segment() {
            "" => "/".to_string(),
            seg => format!("/{}", seg),
        };
        println!("{:<16} {:<8} {}", r.name(), r.api_version().as_str(), path);
    }
    Ok(())
}
