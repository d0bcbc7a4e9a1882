use anyhow::{Context, Result};
use log::info;
use std::net::{SocketAddr, UdpSocket};
use std::path::PathBuf;
use std::time::Duration;

use structfeed::encoder::{Field, StructEncoder};

/// Generate a demo aircraft message
pub fn run(
    output: PathBuf,
    base: i32,
    send: Option<SocketAddr>,
    frames: u32,
    interval_ms: u64,
) -> Result<()> {
    info!("structfeed - Aircraft Telemetry Demo");
    info!("====================================");

    let bytes = build_message(base, 0.0)
        .encode()
        .context("Failed to encode demo message")?;
    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Wrote {} ({} bytes)", output.display(), bytes.len());
    info!("  Tokens: {}", bytes.len() / structfeed::stream::TOKEN_SIZE - 1);
    info!("  Identifier base: {}", base);

    if let Some(target) = send {
        let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to bind sending socket")?;
        info!("Sending {} frames to {}", frames, target);

        for frame in 0..frames {
            let t = frame as f32 * interval_ms as f32 / 1000.0;
            let bytes = build_message(base, t)
                .encode()
                .with_context(|| format!("Failed to encode frame {}", frame))?;
            socket
                .send_to(&bytes, target)
                .with_context(|| format!("Failed to send frame {} to {}", frame, target))?;

            if frame + 1 < frames {
                std::thread::sleep(Duration::from_millis(interval_ms));
            }
        }
        info!("Sent {} frames", frames);
    }

    info!("\nInspect the capture with:");
    info!("  structfeed inspect {}", output.display());
    info!("  structfeed inspect {} --path body.V_Kb", output.display());

    Ok(())
}

/// Aircraft state at simulation time `t`
///
/// Values sit well away from the default identifier base so the default demo
/// always encodes.
fn build_message(base: i32, t: f32) -> StructEncoder {
    let span = [-7.5f32, -3.75, 3.75, 7.5];
    let sweep = 0.4 * t.sin();

    let wing = Field::structure(
        "wing",
        vec![
            Field::structure(
                "vortex",
                vec![
                    Field::data("x", span.map(|y| -0.25 * y.abs() * sweep - 1.2).to_vec()),
                    Field::data("y", span.to_vec()),
                    Field::data("z", vec![-0.35; span.len()]),
                ],
            ),
            Field::structure(
                "cntrl_pt",
                vec![
                    Field::data("x", span.map(|y| -0.25 * y.abs() * sweep - 2.2).to_vec()),
                    Field::data("y", span.map(|y| 0.5 * y).to_vec()),
                    Field::data("z", vec![-0.35; span.len()]),
                ],
            ),
        ],
    );

    let fuselage = Field::structure(
        "fuselage",
        vec![Field::data("length", vec![11.25]), Field::data("width", vec![-1.45])],
    );

    let body = Field::structure(
        "body",
        vec![
            Field::data("q_bg", vec![-0.7, 3.5, -1.5, 8.0]),
            Field::data("V_Kb", vec![55.0 + 0.5 * t, -3.25, 4.5 * t.cos()]),
            Field::data("omega_Kb", vec![-0.05 * t.sin(), -0.02, 0.01]),
        ],
    );

    let config = Field::structure("config", vec![Field::data("xyz_ref_c", vec![-2.5, 3.0, 7.25])]);

    // 3 x 4 matrix, column-major
    let wind = Field::structure(
        "external",
        vec![Field::data(
            "V_Wb",
            (0..12).map(|i| -4.0 - i as f32 * 0.125).collect::<Vec<_>>(),
        )],
    );

    StructEncoder::new()
        .with_base(base)
        .fields([wing, fuselage, body, config, wind])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_message_decodes() {
        let bytes = build_message(1000, 0.5).encode().unwrap();
        let table = structfeed::decode(&bytes).unwrap();

        assert_eq!(
            table.child_struct_names(),
            vec!["wing", "fuselage", "body", "config", "external"]
        );
        assert_eq!(
            table.data_at_path(&["wing", "vortex", "y"]),
            vec![-7.5, -3.75, 3.75, 7.5]
        );
        assert_eq!(table.depth(), 3);

        let wind = table.child_struct("external").child_matrix("V_Wb", 3);
        assert_eq!(wind.len(), 3);
        assert_eq!(wind[0].len(), 4);
    }

    #[test]
    fn test_demo_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("demo.bin");

        run(output.clone(), 1000, None, 1, 0).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        let table = structfeed::decode(&bytes).unwrap();
        assert_eq!(table.data_at_path(&["config", "xyz_ref_c"]), vec![-2.5, 3.0, 7.25]);
    }
}
