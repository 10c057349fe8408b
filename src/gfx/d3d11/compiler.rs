//! FXC 着色器编译器
//!
//! 读取 HLSL 源文件后交给 `D3DCompile` 编译（Shader Model 5.0）。

use std::ffi::CString;

use tracing::debug;
use windows::{core::*, Win32::Graphics::Direct3D::Fxc::*, Win32::Graphics::Direct3D::*};

use crate::renderer::compiler::{CompileFailure, ShaderCompiler, ShaderSource};

/// 基于 `D3DCompile` 的编译器
#[derive(Debug, Default, Clone, Copy)]
pub struct FxcCompiler;

fn blob_bytes(blob: &ID3DBlob) -> Vec<u8> {
    unsafe {
        std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()).to_vec()
    }
}

fn c_string(value: &str) -> std::result::Result<CString, CompileFailure> {
    CString::new(value).map_err(|e| CompileFailure::Diagnostics(e.to_string().into_bytes()))
}

impl ShaderCompiler for FxcCompiler {
    fn compile(&self, source: &ShaderSource) -> std::result::Result<Vec<u8>, CompileFailure> {
        // 源文件读不到时编译器不会产生诊断信息
        let code = std::fs::read(&source.path).map_err(|e| {
            debug!(path = %source.path.display(), error = %e, "Shader source unreadable");
            CompileFailure::MissingSource
        })?;

        let source_name = c_string(&source.path.to_string_lossy())?;
        let entry_point = c_string(&source.entry_point)?;
        let target = c_string(&source.target)?;

        let mut blob: Option<ID3DBlob> = None;
        let mut error_blob: Option<ID3DBlob> = None;

        let result = unsafe {
            D3DCompile(
                code.as_ptr() as *const std::ffi::c_void,
                code.len(),
                PCSTR(source_name.as_ptr() as *const u8),
                None,
                None,
                PCSTR(entry_point.as_ptr() as *const u8),
                PCSTR(target.as_ptr() as *const u8),
                D3DCOMPILE_ENABLE_STRICTNESS,
                0,
                &mut blob,
                Some(&mut error_blob),
            )
        };

        match (result, blob) {
            (Ok(()), Some(blob)) => Ok(blob_bytes(&blob)),
            (result, _) => {
                let message = match error_blob {
                    Some(error) => blob_bytes(&error),
                    None => match result {
                        Err(e) => e.to_string().into_bytes(),
                        Ok(()) => b"D3DCompile produced no bytecode".to_vec(),
                    },
                };
                Err(CompileFailure::Diagnostics(message))
            }
        }
    }
}
