// Tagged member access for correlated grid points.
//
// Tabulated data is stored as arrays of small tuples so that correlated
// values (e.g. outgoing energy and pdf, or weight fraction and atomic
// weight) stay together under a single sort or binary search. The marker
// types below select one member of a tuple at compile time; every access
// monomorphizes to a direct field reference.

/// Selects the first member of a tuple.
pub struct First;
/// Selects the second member of a tuple.
pub struct Second;
/// Selects the third member of a tuple.
pub struct Third;
/// Selects the fourth member of a tuple.
pub struct Fourth;

/// Compile-time-tagged access to one member of a fixed-arity tuple.
///
/// `M` is one of the marker types above. The member types of a tuple are
/// independent; only the selected member must match `Value`.
pub trait Member<T> {
    type Value: Copy;

    fn get(tuple: &T) -> Self::Value;
    fn set(tuple: &mut T, value: Self::Value);
}

macro_rules! impl_member {
    ($marker:ty, $idx:tt, ($($ty:ident),+)) => {
        impl<$($ty: Copy),+> Member<($($ty,)+)> for $marker {
            type Value = access_type!($idx, $($ty),+);

            #[inline(always)]
            fn get(tuple: &($($ty,)+)) -> Self::Value {
                tuple.$idx
            }

            #[inline(always)]
            fn set(tuple: &mut ($($ty,)+), value: Self::Value) {
                tuple.$idx = value;
            }
        }
    };
}

macro_rules! access_type {
    (0, $a:ident $(, $rest:ident)*) => { $a };
    (1, $a:ident, $b:ident $(, $rest:ident)*) => { $b };
    (2, $a:ident, $b:ident, $c:ident $(, $rest:ident)*) => { $c };
    (3, $a:ident, $b:ident, $c:ident, $d:ident) => { $d };
}

impl_member!(First, 0, (A, B));
impl_member!(Second, 1, (A, B));

impl_member!(First, 0, (A, B, C));
impl_member!(Second, 1, (A, B, C));
impl_member!(Third, 2, (A, B, C));

impl_member!(First, 0, (A, B, C, D));
impl_member!(Second, 1, (A, B, C, D));
impl_member!(Third, 2, (A, B, C, D));
impl_member!(Fourth, 3, (A, B, C, D));

/// True if the selected member is strictly increasing across the slice.
pub fn is_sorted_ascending<M, T>(grid: &[T]) -> bool
where
    M: Member<T>,
    M::Value: PartialOrd,
{
    grid.windows(2).all(|w| M::get(&w[0]) < M::get(&w[1]))
}

/// Index of the last element whose selected member is <= `value`.
///
/// Precondition: the member is sorted ascending and
/// `value >= M::get(&grid[0])`.
pub fn binary_lower_bound_index<M, T>(grid: &[T], value: M::Value) -> usize
where
    M: Member<T>,
    M::Value: PartialOrd,
{
    debug_assert!(!grid.is_empty());
    debug_assert!(value >= M::get(&grid[0]));

    let mut low = 0usize;
    let mut high = grid.len();
    while high - low > 1 {
        let mid = (low + high) >> 1;
        if M::get(&grid[mid]) <= value {
            low = mid;
        } else {
            high = mid;
        }
    }
    low
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_access_pair() {
        let mut p = (1.0f64, 2.5f64);
        assert_eq!(<First as Member<(f64, f64)>>::get(&p), 1.0);
        assert_eq!(<Second as Member<(f64, f64)>>::get(&p), 2.5);
        <Second as Member<(f64, f64)>>::set(&mut p, 4.0);
        assert_eq!(p.1, 4.0);
    }

    #[test]
    fn test_member_access_heterogeneous() {
        let t = (0.5f64, 7u32, -1.0f64);
        assert_eq!(<Second as Member<(f64, u32, f64)>>::get(&t), 7);
        assert_eq!(<Third as Member<(f64, u32, f64)>>::get(&t), -1.0);
    }

    #[test]
    fn test_member_access_quad() {
        let q = (1.0f64, 2.0f64, 3.0f64, 4.0f64);
        assert_eq!(<Fourth as Member<(f64, f64, f64, f64)>>::get(&q), 4.0);
    }

    #[test]
    fn test_is_sorted_ascending() {
        let grid = [(1.0, 9.0), (2.0, 4.0), (3.0, 1.0)];
        assert!(is_sorted_ascending::<First, _>(&grid));
        assert!(!is_sorted_ascending::<Second, _>(&grid));
    }

    #[test]
    fn test_binary_lower_bound() {
        let grid = [(1.0, 0.0), (2.0, 0.0), (4.0, 0.0), (8.0, 0.0)];
        assert_eq!(binary_lower_bound_index::<First, _>(&grid, 1.0), 0);
        assert_eq!(binary_lower_bound_index::<First, _>(&grid, 3.0), 1);
        assert_eq!(binary_lower_bound_index::<First, _>(&grid, 4.0), 2);
        assert_eq!(binary_lower_bound_index::<First, _>(&grid, 9.0), 3);
    }
}
