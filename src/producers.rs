// 诊断工具进程调用模块
// 诊断工具在一个作用域受控的临时文件上运行；临时文件随句柄
// Drop 在任何退出路径（成功、失败、panic 展开）上都会被删除。
// 每个工具有固定超时，超时或启动失败都降级为 Failure 结果，
// 不会中断其所在文件的分析，也不会阻塞其他文件。

use crate::normalizer::ProducerOutcome;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tempfile::NamedTempFile;

/// 把变更后的文件内容写入临时 .py 文件，供进程型诊断工具读取
pub fn write_temp_source(content: &str) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("prreview-")
        .suffix(".py")
        .tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// 运行一个诊断命令并收集 stdout，带固定超时
///
/// linter 在有发现时通常以非零码退出，所以只有"非零退出且没有
/// 任何标准输出"才算运行失败；无重试策略，失败按原样上报一次。
pub fn run_producer(command: &str, target: &Path, timeout: Duration) -> ProducerOutcome {
    let command_owned = command.to_string();
    let target_owned = target.to_path_buf();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = Command::new(&command_owned).arg(&target_owned).output();
        // 接收端超时放弃后 send 会失败，忽略即可
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(output)) => {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            if !output.status.success() && stdout.trim().is_empty() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return ProducerOutcome::Failure(format!(
                    "exited with {}: {}",
                    output.status,
                    stderr.trim()
                ));
            }
            ProducerOutcome::Output(stdout)
        }
        Ok(Err(e)) => ProducerOutcome::Failure(format!("failed to launch '{command}': {e}")),
        Err(_) => ProducerOutcome::Failure(format!(
            "'{command}' timed out after {}s",
            timeout.as_secs()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_source_removed_on_drop() {
        let path = {
            let file = write_temp_source("print('hi')\n").unwrap();
            assert!(file.path().exists());
            file.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_executable_degrades_to_failure() {
        let outcome = run_producer(
            "definitely-not-a-real-linter",
            Path::new("/tmp/x.py"),
            Duration::from_secs(5),
        );
        assert!(matches!(outcome, ProducerOutcome::Failure(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_command_captures_stdout() {
        let file = write_temp_source("x = 1\n").unwrap();
        let outcome = run_producer("cat", file.path(), Duration::from_secs(5));
        match outcome {
            ProducerOutcome::Output(text) => assert!(text.contains("x = 1")),
            ProducerOutcome::Failure(e) => panic!("unexpected failure: {e}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_degrades_to_failure() {
        // sleep 不认识 .py 参数也会先睡满默认时长，
        // 用明显小于睡眠时间的超时验证降级路径
        let outcome = run_producer("sleep", Path::new("5"), Duration::from_millis(100));
        match outcome {
            ProducerOutcome::Failure(text) => assert!(text.contains("timed out")),
            ProducerOutcome::Output(_) => panic!("expected timeout"),
        }
    }
}
