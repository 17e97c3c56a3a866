/// Forwards wrapper-table methods to hardware intrinsics.
///
/// # Architecture
/// This macro is the leaf of the crate. Every generated method is `#[inline]`
/// and carries the tier's `#[target_feature]` list, so it only inlines into
/// code compiled for the same (or a wider) tier.
///
/// Methods whose intrinsic takes a const generic, a different argument order
/// or a pointer cast are written by hand next to the invocation. A leading
/// `pub` makes the method an inherent function of the tier marker.
///
/// # Usage
/// ```ignore
/// impl Intrinsics for Avx2 {
///     forward_intrinsics! { "avx2";
///         fn add_ps(a: __m256, b: __m256) -> __m256 => _mm256_add_ps;
///         fn storeu_ps(mem_addr: *mut f32, a: __m256) => _mm256_storeu_ps;
///     }
/// }
/// ```
#[macro_export]
macro_rules! forward_intrinsics {
    ($features:tt; $( $vis:vis fn $name:ident ( $( $arg:ident : $ty:ty ),* ) $( -> $ret:ty )? => $intrinsic:ident ; )* ) => {
        $(
            #[inline]
            #[target_feature(enable = $features)]
            $vis unsafe fn $name( $( $arg : $ty ),* ) $( -> $ret )? {
                $intrinsic( $( $arg ),* )
            }
        )*
    };
}
