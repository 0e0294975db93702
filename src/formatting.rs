//! Renders collected metric snapshots into the report delivered to chat.

use crate::core::{CpuUtilization, DriveUsage, MetricSnapshot, RamUsage, TimeWindow};

/// RFC 2822-style UTC layout, e.g. `Mon, 01 Jan 2024 00:00:00 GMT`.
const HEADER_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub const REPORT_TITLE: &str = "**EC2 Monitoring Details**";

/// Assembles the report: a header identifying the window, then one titled
/// section per snapshot, in the order supplied.
///
/// Pure and deterministic; all inputs are assumed valid.
pub fn compose_report(window: &TimeWindow, snapshots: &[MetricSnapshot]) -> String {
    let mut report = format!(
        "{}\nTime: {} to {}",
        REPORT_TITLE,
        window.start.format(HEADER_TIME_FORMAT),
        window.end.format(HEADER_TIME_FORMAT),
    );

    for snapshot in snapshots {
        report.push_str("\n\n");
        report.push_str(&format_section(snapshot));
    }

    report
}

fn format_section(snapshot: &MetricSnapshot) -> String {
    match snapshot {
        MetricSnapshot::Cpu(cpu) => format_cpu(cpu),
        MetricSnapshot::Drive(drive) => format_drive(drive),
        MetricSnapshot::Ram(ram) => format_ram(ram),
    }
}

fn format_cpu(cpu: &CpuUtilization) -> String {
    format!(
        "__CPU Utilization__\nAverage: {:.2}%\nMaximum: {:.2}%",
        cpu.average, cpu.maximum
    )
}

fn format_drive(drive: &DriveUsage) -> String {
    format!(
        "__Drive Usage__\n\
         Total: {:.2} GB\n\
         Used: {:.2} GB\n\
         Used Percentage: {:.2}%\n\
         Free: {:.2} GB\n\
         Free Percentage: {:.2}%",
        drive.total_gb, drive.used_gb, drive.used_percent, drive.free_gb, drive.free_percent
    )
}

fn format_ram(ram: &RamUsage) -> String {
    format!(
        "__RAM Usage__\n\
         Total: {} MB\n\
         Used: {} MB\n\
         Used Percentage: {:.2}%\n\
         Free: {} MB\n\
         Free Percentage: {:.2}%",
        ram.total_mb, ram.used_mb, ram.used_percent, ram.free_mb, ram.free_percent
    )
}
