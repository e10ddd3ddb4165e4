use port3d::Conversion;

fn main() {
    env_logger::init();

    let mut src = None;
    let mut dst = None;
    macro_rules! help {
        () => {{
            eprintln!("[HELP]: \nConvert a source engine project into a target engine project.");
            eprintln!("Basic Usage: <bin> src_project dst_project");
            return;
        }};
    }
    for v in std::env::args().skip(1) {
        if matches!(v.as_str(), "-h" | "--help") {
            help!();
        }

        if src.is_none() {
            src = Some(v);
        } else if dst.is_none() {
            dst = Some(v)
        } else {
            help!();
        };
    }
    let Some(src) = src else {
        help!();
    };
    let Some(dst) = dst else {
        help!();
    };
    if src.starts_with("-") || dst.starts_with("-") {
        help!();
    }
    println!("[INFO]: {src} -> {dst}");

    let mut conv = Conversion::new(&src, &dst);
    if let Err(e) = conv.run() {
        eprintln!("[ERROR]: {e}");
        std::process::exit(1);
    }
    println!(
        "[INFO]: conversion complete, {} assets mapped",
        conv.assets().len()
    );
}
