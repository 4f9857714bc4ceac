use std::fmt::Write;

/// Emits a ring as the coordinate list of a WKT `POLYGON`, fixed at 10 decimal places so that
/// downstream spatial-SQL predicates built from this string are deterministic.
pub fn ring_to_wkt(ring: &[(f64, f64)]) -> String {
    let mut out = String::from("POLYGON((");
    for (i, (x, y)) in ring.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write!(out, "{x:.10} {y:.10}").expect("writing to a String never fails");
    }
    out.push_str("))");
    out
}
