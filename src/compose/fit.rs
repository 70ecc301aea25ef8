use crate::foundation::core::Rect;

/// Largest rect with the image's aspect ratio that fits inside a `cw`x`ch` surface, centered.
///
/// Images relatively wider than the surface fill its width (letterbox bands above and below);
/// all others fill its height (pillarbox bands left and right). Zero-sized inputs collapse to an
/// empty rect at the surface center.
pub fn contain_fit(cw: f64, ch: f64, iw: f64, ih: f64) -> Rect {
    if !(cw > 0.0 && ch > 0.0 && iw > 0.0 && ih > 0.0) {
        let (cx, cy) = (cw.max(0.0) / 2.0, ch.max(0.0) / 2.0);
        return Rect::new(cx, cy, cx, cy);
    }

    let ca = cw / ch;
    let ia = iw / ih;
    if ia > ca {
        let rh = cw / ia;
        let y = (ch - rh) / 2.0;
        Rect::new(0.0, y, cw, y + rh)
    } else {
        let rw = ch * ia;
        let x = (cw - rw) / 2.0;
        Rect::new(x, 0.0, x + rw, ch)
    }
}

/// Margins left around a fitted rect: `(horizontal, vertical)`, per side.
pub fn fit_margins(cw: f64, ch: f64, fitted: Rect) -> (f64, f64) {
    ((cw - fitted.width()) / 2.0, (ch - fitted.height()) / 2.0)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/fit.rs"]
mod tests;
