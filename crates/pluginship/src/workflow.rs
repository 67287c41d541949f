//! Release workflow
//!
//! Packaging runs as a single linear pass:
//!
//! 1. normalize the repository identifier into a URL
//! 2. find the release tag with `git describe`
//! 3. make sure the output directory exists
//! 4. read framework and target ABI from the project descriptor
//! 5. patch the metadata file, run `jprm plugin build`, restore the metadata
//! 6. derive the public download URL of the archive
//!
//! Registration (`jprm repo add`) is a separate step so the caller can report
//! the artifact before jprm starts writing to the terminal.

use std::path::PathBuf;

use tracing::{info, instrument, warn};

use pluginship_core::{
    download_url, locate_descriptor, normalize_repository_url, Config, EphemeralFields,
    MetadataPatch, PluginshipError, ProjectDescriptor, ReleaseSummary, ReleaseTag, Result,
    ToolRunner,
};
use pluginship_git::GitCli;
use pluginship_tools::{BuildRequest, Jprm};

/// Caller-supplied release inputs
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    /// Repository URL, `host/owner/repo`, or `owner/repo`
    pub repository: String,
    /// Release notes, written to the changelog field verbatim
    pub release_notes: String,
}

/// Packages and registers a plugin release
pub struct ReleaseWorkflow<'a> {
    config: &'a Config,
    runner: &'a dyn ToolRunner,
    root: PathBuf,
}

impl<'a> ReleaseWorkflow<'a> {
    /// Create a workflow operating on the project in `root`.
    ///
    /// `runner` must execute programs from `root` as well, since paths handed
    /// to jprm are relative to it.
    pub fn new(config: &'a Config, runner: &'a dyn ToolRunner, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            runner,
            root: root.into(),
        }
    }

    fn jprm(&self) -> Jprm<'a> {
        Jprm::new(self.runner)
            .with_program(&self.config.tools.jprm)
            .with_verbosity(&self.config.tools.verbosity)
    }

    /// Build the plugin archive and work out where it will be downloaded from
    #[instrument(skip(self, options), fields(repository = %options.repository))]
    pub fn package(&self, options: &ReleaseOptions) -> Result<ReleaseSummary> {
        let repository_url =
            normalize_repository_url(&options.repository, &self.config.repository.host);
        info!(repository_url = %repository_url, "resolved repository");

        let tag = GitCli::with_program(self.runner, &self.config.tools.git)
            .latest_release_tag(&self.config.git.tag_match)?;

        self.ensure_output_dir()?;

        let descriptor_path =
            locate_descriptor(&self.root, self.config.project.descriptor.as_deref())?;
        let descriptor = ProjectDescriptor::load(&descriptor_path, &self.config.project.abi_package)?;

        let artifact = self.build(&tag, &descriptor, &options.release_notes)?;
        let url = download_url(&repository_url, &tag.name, &artifact);
        info!(artifact = %artifact.display(), url = %url, "packaged release");

        Ok(ReleaseSummary {
            repository_url,
            tag: tag.name,
            version: tag.version,
            framework: descriptor.framework,
            target_abi: descriptor.target_abi,
            artifact,
            download_url: url,
            manifest: self.config.repository.manifest.clone(),
            registered: false,
        })
    }

    /// Add a packaged release to the repository manifest
    #[instrument(skip(self, summary), fields(url = %summary.download_url))]
    pub fn register(&self, summary: &mut ReleaseSummary) -> Result<()> {
        self.jprm()
            .repo_add(&summary.download_url, &summary.manifest, &summary.artifact)?;
        summary.registered = true;
        Ok(())
    }

    /// Create the output directory unless it already exists
    fn ensure_output_dir(&self) -> Result<PathBuf> {
        let dir = self.root.join(&self.config.build.output_dir);
        if dir.exists() && !dir.is_dir() {
            return Err(PluginshipError::NotADirectory(dir));
        }
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Run the build with the ephemeral metadata fields in place.
    ///
    /// The metadata file is restored whether or not the build succeeds. A build
    /// failure takes precedence over a failure to restore.
    fn build(
        &self,
        tag: &ReleaseTag,
        descriptor: &ProjectDescriptor,
        release_notes: &str,
    ) -> Result<PathBuf> {
        let metadata = &self.config.metadata;
        let fields = EphemeralFields::new(&descriptor.target_abi, release_notes)
            .with_keys(&metadata.abi_key, &metadata.changelog_key);
        let patch = MetadataPatch::apply(&self.root.join(&metadata.file), &fields)?;

        let request = BuildRequest {
            framework: &descriptor.framework,
            max_cpu_count: self.config.max_cpu_count(),
            version: &tag.version,
            output_dir: &self.config.build.output_dir,
        };
        let built = self.jprm().plugin_build(&request);
        let restored = patch.restore();

        match (built, restored) {
            (Ok(artifact), Ok(())) => Ok(artifact),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), restored) => {
                if let Err(restore_err) = restored {
                    warn!(error = %restore_err, "failed to restore metadata after failed build");
                }
                Err(e.into())
            }
        }
    }
}
