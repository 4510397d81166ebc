use std::fmt;

use super::types::Topology;

/// Human-readable summary of a validated topology.
///
/// Passwords are masked with [`mask_password`].
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a>(pub &'a Topology);

/// Render [`Summary`] into a string.
pub fn render_summary(topology: &Topology) -> String {
    Summary(topology).to_string()
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.0;
        writeln!(out, "=== PostgreSQL HA Streaming Replication Configuration ===")?;
        writeln!(out)?;

        let p = &t.primary;
        writeln!(out, "Primary Server:")?;
        writeln!(out, "  Host: {}:{}", p.host, p.port)?;
        writeln!(out, "  Data Directory: {}", p.data_directory)?;
        writeln!(out, "  Replication User: {}", p.replication_user)?;
        writeln!(out, "  Password: {}", mask_password(&p.replication_password))?;

        writeln!(out)?;
        writeln!(out, "Replicas ({} configured):", t.replicas.len())?;
        for (i, r) in t.replicas.iter().enumerate() {
            writeln!(out, "  {}. {}:{}", i + 1, r.host, r.port)?;
            writeln!(out, "     Replication Slot: {}", r.replication_slot)?;
            writeln!(out, "     Sync Mode: {}", r.sync_mode)?;
        }

        let o = &t.options;
        writeln!(out)?;
        writeln!(out, "PostgreSQL Streaming Options:")?;
        writeln!(out, "  WAL Level: {}", o.wal_level)?;
        writeln!(out, "  Max WAL Senders: {}", o.max_wal_senders)?;
        writeln!(out, "  WAL Keep Size: {}", o.wal_keep_size)?;
        writeln!(out, "  Hot Standby: {}", o.hot_standby)?;
        writeln!(out, "  Synchronous Commit: {}", o.synchronous_commit)?;
        writeln!(out, "  Auto-promote on Primary Failure: {}", o.promote_on_failure)?;

        writeln!(out)?;
        match &t.monitoring {
            Some(m) if m.datadog.enabled => {
                writeln!(out, "Monitoring: Datadog enabled (site {})", m.datadog.site)?
            }
            Some(_) => writeln!(out, "Monitoring: Datadog configured but disabled")?,
            None => writeln!(out, "Monitoring: none")?,
        }

        writeln!(out)?;
        writeln!(out, "=== Configuration Summary ===")?;
        writeln!(
            out,
            "Total nodes: {} (1 primary + {} replicas)",
            1 + t.replicas.len(),
            t.replicas.len()
        )?;
        writeln!(out, "Replication type: PostgreSQL Streaming Replication")?;
        if o.promote_on_failure {
            writeln!(out, "Failover: Automatic promotion enabled")?;
        } else {
            writeln!(out, "Failover: Manual promotion only")?;
        }
        Ok(())
    }
}

/// Hide most of a password, keeping two characters at each end when it is
/// long enough for that to reveal little.
pub fn mask_password(password: &str) -> String {
    let chars: Vec<char> = password.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}****{tail}")
}
