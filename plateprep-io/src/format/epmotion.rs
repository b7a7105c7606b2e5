use plateprep_core::errors::Result;
use plateprep_core::geometry::WellMatrix;

use crate::consts::EPMOTION_HEADER;
use crate::format::transfers;

///
/// Render an EPMotion transfer file moving every well into one tube.
///
/// Source wells are written in lower case (`a2`), volumes with three decimals.
///
/// # Arguments
/// - volumes: the volume to transfer out of each well
/// - destination: the destination tube
///
pub fn format_epmotion_file(volumes: &WellMatrix<f64>, destination: u32) -> Result<String> {
    let mut contents = vec![EPMOTION_HEADER.to_string()];
    for (label, vol) in transfers(volumes)? {
        contents.push(format!(
            "1,{},1,{},{:.3},1",
            label.to_lowercase(),
            destination,
            vol
        ));
    }
    Ok(contents.join("\n"))
}
