//! 色彩空间换算
//!
//! 所有输入输出都是归一化分量；色相统一使用角度 `[0, 360)`。

/// RGB → HSL，返回 `(色相°, 饱和度, 亮度)`
///
/// 多个分量同为最大值时按 R → G → B 的顺序取第一个匹配的扇区。
pub fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max_c = r.max(g).max(b);
    let min_c = r.min(g).min(b);
    let delta = max_c - min_c;
    let l = (max_c + min_c) / 2.0;

    // 唯一产生 S = 0 的分支
    if delta == 0.0 {
        return (0.0, 0.0, l);
    }

    let s = if l < 0.5 {
        delta / (max_c + min_c)
    } else {
        delta / (2.0 - max_c - min_c)
    };

    (hue_degrees(r, g, b, max_c, delta), s, l)
}

/// HSL → RGB
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let m = l - c / 2.0;
    from_chroma(h, c, m)
}

/// RGB → HSB（HSV），返回 `(色相°, 饱和度, 明度)`
pub fn rgb_to_hsb(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max_c = r.max(g).max(b);
    let min_c = r.min(g).min(b);
    let delta = max_c - min_c;

    if delta == 0.0 {
        return (0.0, 0.0, max_c);
    }

    (hue_degrees(r, g, b, max_c, delta), delta / max_c, max_c)
}

/// HSB（HSV）→ RGB
pub fn hsb_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let c = v * s;
    let m = v - c;
    from_chroma(h, c, m)
}

fn hue_degrees(r: f64, g: f64, b: f64, max_c: f64, delta: f64) -> f64 {
    let sector = if max_c == r {
        // `%` 为截断取余，负值在最后统一补 360
        ((g - b) / delta) % 6.0
    } else if max_c == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    let hue = sector * 60.0;
    if hue < 0.0 { hue + 360.0 } else { hue }
}

/// 由色度、中间量和匹配点按 60° 扇区还原 RGB
fn from_chroma(h: f64, c: f64, m: f64) -> (f64, f64, f64) {
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());

    let (r1, g1, b1) = match h {
        h if (0.0..60.0).contains(&h) => (c, x, 0.0),
        h if (60.0..120.0).contains(&h) => (x, c, 0.0),
        h if (120.0..180.0).contains(&h) => (0.0, c, x),
        h if (180.0..240.0).contains(&h) => (0.0, x, c),
        h if (240.0..300.0).contains(&h) => (x, 0.0, c),
        // [300, 360]；360° 与 0° 同为红色
        _ => (c, 0.0, x),
    };

    (r1 + m, g1 + m, b1 + m)
}
