use sysinfo::System;

#[derive(Debug, Clone)]
pub struct CpuSummary {
    pub brand: String,
    pub logical_cpus: usize,
}

pub fn cpu_summary() -> CpuSummary {
    let mut sys = System::new();
    sys.refresh_cpu_all();

    let brand = sys
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| "unknown CPU".to_string());

    CpuSummary {
        brand,
        logical_cpus: num_cpus::get(),
    }
}
