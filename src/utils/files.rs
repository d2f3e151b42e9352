use crate::utils::common::join_location;
use crate::utils::session::Report;

use csv::WriterBuilder;
use std::{ error::Error, fs::File, path::Path };

// 两张表的列数不一样，所以用 flexible 模式
pub fn write_to_csv<P>(csv_file: P, records: Vec<Vec<String>>) -> Result<(), Box<dyn Error>>
    where P: AsRef<Path>
{
    let file = File::create(csv_file)?;
    let mut wtr = WriterBuilder::new().flexible(true).from_writer(file);
    for row in records {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn provider_records(report: &Report) -> Vec<Vec<String>> {
    let mut records = vec![
        ["provider", "scope", "status", "ip", "version", "location", "isp", "asn", "timezone"]
            .map(String::from)
            .to_vec()
    ];
    for row in &report.geo.providers {
        let mut record = vec![row.id.clone(), row.scope.to_string(), row.status.label().to_string()];
        match &row.result {
            Some(r) =>
                record.extend([
                    r.ip.clone(),
                    r.version.to_string(),
                    join_location(&[r.city.as_str(), r.region.as_str(), r.country.as_str()]),
                    r.isp.clone(),
                    r.asn.clone(),
                    r.timezone.clone(),
                ]),
            None => record.extend(std::iter::repeat(String::new()).take(6)),
        }
        records.push(record);
    }
    records
}

pub fn probe_records(report: &Report) -> Vec<Vec<String>> {
    let mut records = vec![["site", "scope", "url", "elapsed_ms", "status"].map(String::from).to_vec()];
    for row in &report.connectivity.rows {
        records.push(
            vec![
                row.site.name.clone(),
                row.site.scope.to_string(),
                row.site.url.clone(),
                row.outcome.map(|o| o.elapsed_ms.to_string()).unwrap_or_default(),
                row.status().label().to_string()
            ]
        );
    }
    records
}

// 导出两张表（不受过滤开关影响），中间空一行
pub fn write_report_csv<P>(csv_file: P, report: &Report) -> Result<(), Box<dyn Error>>
    where P: AsRef<Path>
{
    let mut records = provider_records(report);
    records.push(vec![String::new()]);
    records.extend(probe_records(report));
    write_to_csv(csv_file, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::network::ProviderSpec;
    use crate::utils::probe::{ default_sites, DEFAULT_PROBE_TIMEOUT_MS };
    use crate::utils::session::Session;
    use std::time::Duration;

    #[test]
    fn report_csv_has_both_tables() {
        let session = Session::new(
            ProviderSpec::defaults(),
            default_sites(),
            Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS)
        );
        let report = session.report();
        assert_eq!(provider_records(&report).len(), 5);
        assert_eq!(probe_records(&report).len(), 9);
        assert!(provider_records(&report)[1].iter().skip(3).all(|cell| cell.is_empty()));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_report_csv(&path, &report).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("provider,scope,status,ip"));
        assert!(text.contains("baidu-qifu,domestic,等待中"));
        assert!(text.contains("site,scope,url,elapsed_ms,status"));
        assert!(text.contains("GitHub,global,https://github.com/favicon.ico,,测试中"));
    }
}
