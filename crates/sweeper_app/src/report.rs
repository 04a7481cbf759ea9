use std::fmt::Write as _;

use sweeper_core::ChannelInfo;
use sweeper_engine::LeaveReport;

/// Orders matches by name, then id, so repeated runs print identically.
pub fn sort_channels(channels: &mut [ChannelInfo]) {
    channels.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

pub fn format_channel_line(index: usize, total: usize, channel: &ChannelInfo) -> String {
    let mut line = format!("[{}/{}] #{:<30} ID: {}", index + 1, total, channel.name, channel.id);
    if let Some(at) = channel.last_activity {
        let _ = write!(line, " — Last message: {}", at.to_rfc2822());
    }
    line
}

/// Listing printed before the leave prompt. Expects already sorted input.
pub fn render_matches(channels: &[ChannelInfo]) -> String {
    let total = channels.len();
    let mut out = format!("Found {total} channels matching criteria:\n");
    for (index, channel) in channels.iter().enumerate() {
        out.push_str(&format_channel_line(index, total, channel));
        out.push('\n');
    }
    out
}

pub fn render_leave_summary(report: &LeaveReport) -> String {
    let mut out = format!(
        "Left {} of {} channels.",
        report.left.len(),
        report.attempted()
    );
    for (channel, err) in &report.failed {
        let _ = write!(out, "\n  failed: #{} ({}): {}", channel.name, channel.id, err);
    }
    out
}
