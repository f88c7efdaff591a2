//! Terminal rendering of build records

use colored::*;
use quay_core::domain::build::{BuildRecord, BuildResult};

/// Print a one-build summary for listings
pub fn print_build_summary(build: &BuildRecord) {
    println!("  {} Build {}", "▸".cyan(), build.job_id.dimmed());
    if !build.repo_slug.is_empty() {
        println!("    Repository: {}", build.repo_slug);
    }
    println!("    Commit:     {}", build.commit_sha.dimmed());
    println!("    Result:     {}", colorize_result(build.result));
    if let Some(timestamp) = &build.timestamp {
        println!("    Finished:   {}", timestamp.dimmed());
    }
    println!();
}

/// Print detailed build information including the run log
pub fn print_build_details(build: &BuildRecord) {
    println!("{}", "Build Details:".bold());
    println!("  Job ID:     {}", build.job_id.cyan());
    println!("  Result:     {}", colorize_result(build.result));
    println!("  Commit:     {}", build.commit_sha);
    if !build.repo_slug.is_empty() {
        println!("  Repository: {}", build.repo_slug);
    }
    if !build.report_url.is_empty() {
        println!("  Details:    {}", build.report_url.dimmed());
    }
    if let Some(timestamp) = &build.timestamp {
        println!("  Finished:   {}", timestamp);
    }

    if build.log.is_empty() {
        return;
    }

    println!("\n{}", "Log:".bold());
    println!("{}", "─".repeat(80).dimmed());
    for entry in build.log.entries() {
        for line in entry {
            println!("{}", line);
        }
    }
    println!("{}", "─".repeat(80).dimmed());
}

/// Colorize a build result for display
pub fn colorize_result(result: BuildResult) -> ColoredString {
    let text = result.as_str();
    match result {
        BuildResult::Pending => text.yellow(),
        BuildResult::Success => text.green(),
        BuildResult::Failure => text.red(),
        BuildResult::Error => text.red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorize_keeps_result_name() {
        colored::control::set_override(false);
        assert_eq!(colorize_result(BuildResult::Success).to_string(), "success");
        assert_eq!(colorize_result(BuildResult::Error).to_string(), "error");
    }
}
