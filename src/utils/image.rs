use anyhow::Error;
use ndarray::Array3;
use opencv::core::{CV_8UC3, Mat, MatTraitConst, MatTraitConstManual};

/// mat_to_ndarray copies an 8-bit, 3-channel `Mat` into an `[H, W, 3]` array
/// for estimators that take ndarray input.
pub fn mat_to_ndarray(img: &Mat) -> Result<Array3<u8>, Error> {
    if img.typ() != CV_8UC3 {
        return Err(Error::msg(format!("expected an 8-bit 3-channel image, got type {}", img.typ())))
    }

    let rows = img.rows() as usize;
    let cols = img.cols() as usize;
    let data = if img.is_continuous() {
        img.data_bytes()?.to_vec()
    } else {
        img.try_clone()?.data_bytes()?.to_vec()
    };

    Ok(Array3::from_shape_vec((rows, cols, 3), data)?)
}

#[cfg(test)]
mod tests {
    use opencv::core::{CV_8UC1, CV_8UC3, Mat, Scalar};
    use crate::utils::image::mat_to_ndarray;

    #[test]
    fn test_mat_to_ndarray() {
        let img = Mat::new_rows_cols_with_default(2, 3, CV_8UC3, Scalar::new(1.0, 2.0, 3.0, 0.0)).unwrap();
        let arr = mat_to_ndarray(&img).unwrap();

        assert_eq!(arr.dim(), (2, 3, 3));
        assert_eq!(arr[[1, 2, 0]], 1);
        assert_eq!(arr[[1, 2, 2]], 3);
    }

    #[test]
    fn test_mat_to_ndarray_rejects_gray() {
        let img = Mat::new_rows_cols_with_default(2, 2, CV_8UC1, Scalar::all(0.0)).unwrap();
        assert!(mat_to_ndarray(&img).is_err());
    }
}
