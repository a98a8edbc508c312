use kernel::KernelError;

/// Maps infrastructure errors into the kernel taxonomy while keeping the
/// original error in the report stack.
pub trait ConvertError {
    type Ok;
    fn convert_error(self) -> error_stack::Result<Self::Ok, KernelError>;
}
