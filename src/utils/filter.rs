use crate::utils::models::{ ProbeRow, ProviderRow, Scope };
use serde::Serialize;

/// 两个独立的开关：隐藏国内 / 隐藏国际
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    pub hide_domestic: bool,
    pub hide_global: bool,
}

impl ScopeFilter {
    pub fn new(hide_domestic: bool, hide_global: bool) -> Self {
        ScopeFilter { hide_domestic, hide_global }
    }

    pub fn hides(&self, scope: Scope) -> bool {
        match scope {
            Scope::Domestic => self.hide_domestic,
            Scope::Global => self.hide_global,
        }
    }
}

// 每次开关变化都把两张表从头扫一遍
pub fn apply_scope_filter(filter: ScopeFilter, providers: &mut [ProviderRow], probes: &mut [ProbeRow]) {
    for row in providers.iter_mut() {
        row.hidden = filter.hides(row.scope);
    }
    for row in probes.iter_mut() {
        row.hidden = filter.hides(row.site.scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::models::{ ConnectivitySite, RowStatus };

    fn provider(id: &str, scope: Scope) -> ProviderRow {
        ProviderRow {
            id: id.to_string(),
            name: id.to_string(),
            scope,
            status: RowStatus::Pending,
            result: None,
            error: None,
            hidden: false,
        }
    }

    fn probe(name: &str, scope: Scope) -> ProbeRow {
        ProbeRow {
            site: ConnectivitySite::new(name, "https://example.com/favicon.ico", scope),
            outcome: None,
            hidden: false,
        }
    }

    fn rows() -> (Vec<ProviderRow>, Vec<ProbeRow>) {
        (
            vec![provider("baidu-qifu", Scope::Domestic), provider("ip-sb", Scope::Global)],
            vec![probe("淘宝", Scope::Domestic), probe("GitHub", Scope::Global)],
        )
    }

    fn hidden(providers: &[ProviderRow], probes: &[ProbeRow]) -> Vec<bool> {
        providers
            .iter()
            .map(|r| r.hidden)
            .chain(probes.iter().map(|r| r.hidden))
            .collect()
    }

    #[test]
    fn hide_domestic_hides_domestic_rows_in_both_tables() {
        let (mut providers, mut probes) = rows();
        apply_scope_filter(ScopeFilter::new(true, false), &mut providers, &mut probes);
        assert_eq!(hidden(&providers, &probes), [true, false, true, false]);
    }

    #[test]
    fn both_and_neither() {
        let (mut providers, mut probes) = rows();
        apply_scope_filter(ScopeFilter::new(true, true), &mut providers, &mut probes);
        assert_eq!(hidden(&providers, &probes), [true, true, true, true]);

        apply_scope_filter(ScopeFilter::default(), &mut providers, &mut probes);
        assert_eq!(hidden(&providers, &probes), [false, false, false, false]);
    }

    #[test]
    fn hide_global_only() {
        let (mut providers, mut probes) = rows();
        apply_scope_filter(ScopeFilter::new(false, true), &mut providers, &mut probes);
        assert_eq!(hidden(&providers, &probes), [false, true, false, true]);
    }
}
