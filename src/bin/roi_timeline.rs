#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("roi_timeline error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::PathBuf;

    use radview_engine::camera::{AnimationPhase, Animator, Frame};
    use radview_engine::config::ViewerConfig;
    use radview_engine::report::normalize::parse_report_response;

    const USAGE: &str = r#"roi_timeline (radview-engine)

Simuleert de ROI-camera-animatie voor een opgeslagen rapport-response en
print elke faseovergang.

USAGE:
  roi_timeline <report.json> [options]

OPTIONS:
  --id <n>           Rapport-id als de response er geen bevat (default 0)
  --fps <n>          Frames per seconde (default 60)
  --seconds <s>      Gesimuleerde duur in seconden (default 60)
  --config <path>    ViewerConfig als JSON
  -h, --help         Show this help
"#;

    struct Options {
        report_path: PathBuf,
        report_id: u64,
        fps: u32,
        seconds: f64,
        config_path: Option<PathBuf>,
    }

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let Some(options) = parse_options(Args::new(args))? else {
            println!("{USAGE}");
            return Ok(());
        };

        let config = match options.config_path.as_ref() {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
                ViewerConfig::from_json_str(&text).map_err(|err| err.to_string())?
            }
            None => ViewerConfig::default(),
        };

        let text = fs::read_to_string(&options.report_path)
            .map_err(|err| format!("cannot read {}: {err}", options.report_path.display()))?;
        let report =
            parse_report_response(&text, options.report_id).map_err(|err| err.to_string())?;

        println!(
            "report {} ({} ROI's, volume {:?})",
            report.id,
            report.segments_of_interest.len(),
            report.volume_shape
        );

        let mut animator = Animator::new(&report, &config);
        let dt = 1.0 / f64::from(options.fps);
        let frames = (options.seconds * f64::from(options.fps)).ceil() as u64;

        let mut last_phase = animator.phase();
        print_transition(0.0, None, &animator.frame());
        for idx in 1..=frames {
            let frame = animator.advance(dt);
            if frame.phase != last_phase {
                print_transition(idx as f64 * dt, Some(last_phase), &frame);
                last_phase = frame.phase;
            }
        }

        println!("cycles completed: {}", animator.cycles_completed());
        Ok(())
    }

    fn parse_options(mut args: Args) -> Result<Option<Options>, String> {
        let mut report_path: Option<PathBuf> = None;
        let mut report_id = 0;
        let mut fps = 60;
        let mut seconds = 60.0_f64;
        let mut config_path = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--id" => report_id = parse_number(&args.value("--id")?, "--id")?,
                "--fps" => fps = parse_number(&args.value("--fps")?, "--fps")?,
                "--seconds" => seconds = parse_number(&args.value("--seconds")?, "--seconds")?,
                "--config" => config_path = Some(PathBuf::from(args.value("--config")?)),
                "-h" | "--help" => return Ok(None),
                other if other.starts_with("--") => {
                    return Err(format!("unknown option `{other}`\n\n{USAGE}"));
                }
                other => {
                    if report_path.replace(PathBuf::from(other)).is_some() {
                        return Err(format!("unexpected argument `{other}`"));
                    }
                }
            }
        }

        let Some(report_path) = report_path else {
            return Ok(None);
        };
        if fps == 0 {
            return Err("--fps must be at least 1".to_owned());
        }
        if !(seconds.is_finite() && seconds >= 0.0) {
            return Err("--seconds must be a non-negative number".to_owned());
        }

        Ok(Some(Options {
            report_path,
            report_id,
            fps,
            seconds,
            config_path,
        }))
    }

    fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T, String> {
        value
            .parse()
            .map_err(|_| format!("invalid value `{value}` for {flag}"))
    }

    fn print_transition(time: f64, from: Option<AnimationPhase>, frame: &Frame) {
        let from = from.map_or("-", AnimationPhase::name);
        let roi = frame.roi_name.as_deref().unwrap_or("<full body>");
        println!(
            "{time:8.3}s  {from:>10} -> {:<10}  roi={roi:<16} d={:.1} h={:.1} yaw={:.3} look_at=[{:.1}, {:.1}, {:.1}]",
            frame.phase.name(),
            frame.pose.distance,
            frame.pose.height,
            frame.pose.yaw,
            frame.pose.look_at[0],
            frame.pose.look_at[1],
            frame.pose.look_at[2],
        );
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }

}
