/// Generate one test per named value, binding it to `$v` inside of the body.
/// Useful for running the same scenario over every strategy variant.
#[macro_export]
macro_rules! test_t {
  ($name:ident[$v:ident: $($tag:ident = $value:expr),+ $(,)?]() $body:tt ) => {$(
      ::paste::paste! {
          #[test]
          fn [<test_ $name _ $tag>]() {
            let $v = $value;
            $body
          }
      }
  )+};
}

#[macro_export]
macro_rules! assert_f64_approx {
    ($l:expr, $r:expr) => {
        assert!(
            ($l - $r).abs() < f64::EPSILON,
            "assertion failed: {} !~ {}",
            $l,
            $r
        )
    };
    ($l:expr, $r:expr, $msg:expr) => {
        assert!(
            ($l - $r).abs() < f64::EPSILON,
            "assertion failed: {} !~ {}: {}",
            $l,
            $r,
            $msg
        )
    };
}
